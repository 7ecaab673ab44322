// Arithmetic problem generation.
use rand::Rng;
use rand::seq::SliceRandom;
use std::fmt;

/// The four operation kinds; rounds cycle through them evenly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operation {
    pub const ALL: [Operation; 4] = [Operation::Add, Operation::Subtract, Operation::Multiply, Operation::Divide];

    pub fn symbol(self) -> &'static str {
        match self {
            Operation::Add => "+",
            Operation::Subtract => "-",
            Operation::Multiply => "×",
            Operation::Divide => "÷",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Problem {
    pub lhs: i64,
    pub rhs: i64,
    pub answer: i64,
    pub op: Operation,
}

impl Problem {
    /// Draw one problem. Sums and differences use operands in 2..=50, products
    /// and quotients 2..=12. Division is built from its answer so it is always exact.
    pub fn generate<R: Rng + ?Sized>(op: Operation, rng: &mut R) -> Self {
        let (lhs, rhs, answer) = match op {
            Operation::Add => {
                let (a, b) = (rng.gen_range(2..=50), rng.gen_range(2..=50));
                (a, b, a + b)
            }
            Operation::Subtract => {
                let (a, b) = (rng.gen_range(2..=50), rng.gen_range(2..=50));
                (a, b, a - b)
            }
            Operation::Multiply => {
                let (a, b) = (rng.gen_range(2..=12), rng.gen_range(2..=12));
                (a, b, a * b)
            }
            Operation::Divide => {
                let b = rng.gen_range(2..=12);
                let answer = rng.gen_range(2..=12);
                (b * answer, b, answer)
            }
        };
        Self { lhs, rhs, answer, op }
    }

    pub fn question(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.lhs, self.op.symbol(), self.rhs)
    }
}

/// Build `count` problems round-robin over [`Operation::ALL`], then shuffle.
pub fn generate_problems<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<Problem> {
    let mut problems: Vec<Problem> = (0..count)
        .map(|i| Problem::generate(Operation::ALL[i % Operation::ALL.len()], rng))
        .collect();
    // SliceRandom::shuffle is a Fisher-Yates pass.
    problems.shuffle(rng);
    problems
}
