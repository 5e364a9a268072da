mod args;

pub use args::{CliArgs, Command, CommonArgs, CompressionLevel, InspectArgs, PackingHeuristic};
