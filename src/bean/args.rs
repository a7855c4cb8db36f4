use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "bean")]
#[command(about = "Spaced-repetition reviews of your tagged notes", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Verbose output (logs reconciliation progress to stderr)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sync cards with the notes database
    #[command(alias = "s")]
    Sync,

    /// List topics
    #[command(alias = "ls")]
    Topics,

    /// Show the next card due in a topic
    #[command(alias = "n")]
    Next {
        /// Topic name (e.g. rust)
        topic: String,
    },

    /// Grade a card after reviewing it
    #[command(alias = "r")]
    Reflect {
        /// Topic name
        topic: String,

        /// Note key (unique identifier)
        key: String,

        /// Recall quality, 0 (blackout) to 5 (perfect)
        #[arg(allow_negative_numbers = true)]
        quality: i64,
    },

    /// Show the review schedule of a topic
    Cards {
        /// Topic name
        topic: String,
    },

    /// Get or set configuration
    Config {
        /// Configuration key (notes-db, topic-marker, lock-timeout-ms)
        key: Option<String>,

        /// Value to set (if omitted, prints current value)
        value: Option<String>,
    },
}
