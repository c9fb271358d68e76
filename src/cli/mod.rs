mod args;

pub use args::{CheckArgs, CliArgs, Command, MaskArgs};
