use rand::Rng;

/// Motivational quotes shown alongside the list
pub const QUOTES: &[&str] = &[
    "Pleasure in the job puts perfection in the work. – Aristotle",
    "It is not the mountain we conquer, but ourselves. – Sir Edmund Hillary",
    "Lost time is never found again. – Benjamin Franklin",
    "Productivity is being able to do things that you were never able to do before. – Franz Kafka",
    "You may delay, but time will not. – Benjamin Franklin",
    "Both good and bad days should end with productivity. Your mood affairs should never influence your work. – Greg Evans",
    "Until we can manage time, we can manage nothing else. – Peter Drucker",
];

/// Pick a quote uniformly at random
pub fn random_quote() -> &'static str {
    random_quote_with(&mut rand::rng())
}

pub fn random_quote_with<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    QUOTES[rng.random_range(0..QUOTES.len())]
}
