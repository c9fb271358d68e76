use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "sprite-collide")]
#[command(version, about = "Pixel-accurate sprite collision tester", long_about = None)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Test every pair of sprites in a scene file and report collisions
    Check(CheckArgs),
    /// Build the opacity mask of one sprite sheet and report per-cell coverage
    Mask(MaskArgs),
}

#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    /// Scene file describing atlases and sprite placements
    pub scene: PathBuf,

    /// Alpha value at or below which texels are transparent [default: 0]
    #[arg(short, long, value_name = "ALPHA")]
    pub threshold: Option<u8>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Args, Debug, Clone)]
pub struct MaskArgs {
    /// Sprite sheet image
    pub image: PathBuf,

    /// Number of cell columns in the sheet
    #[arg(long, default_value_t = 1)]
    pub columns: u32,

    /// Number of cell rows in the sheet
    #[arg(long, default_value_t = 1)]
    pub rows: u32,

    /// Alpha value at or below which texels are transparent [default: 0]
    #[arg(short, long, value_name = "ALPHA")]
    pub threshold: Option<u8>,

    /// Write the mask as a black and white PNG
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_check() {
        let cli = CliArgs::try_parse_from(["sprite-collide", "check", "scene.json", "-t", "32"])
            .unwrap();
        match cli.command {
            Command::Check(args) => {
                assert_eq!(args.scene, PathBuf::from("scene.json"));
                assert_eq!(args.threshold, Some(32));
                assert!(!args.verbose);
            }
            Command::Mask(_) => panic!("expected check"),
        }
    }

    #[test]
    fn test_parse_mask_defaults() {
        let cli = CliArgs::try_parse_from(["sprite-collide", "mask", "ship.png"]).unwrap();
        match cli.command {
            Command::Mask(args) => {
                assert_eq!((args.columns, args.rows), (1, 1));
                assert_eq!(args.threshold, None);
                assert_eq!(args.output, None);
            }
            Command::Check(_) => panic!("expected mask"),
        }
    }

    #[test]
    fn test_threshold_must_fit_alpha() {
        let parsed = CliArgs::try_parse_from(["sprite-collide", "check", "s.json", "-t", "300"]);
        assert!(parsed.is_err());
    }
}
