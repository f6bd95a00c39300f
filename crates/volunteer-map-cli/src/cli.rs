use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "volunteer-map")]
#[command(about = "Find, join and create volunteer events near you", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in and keep the session for later commands
    Login {
        /// Email to log in with (defaults to the last one used)
        #[arg(long)]
        email: Option<String>,

        /// Remember the password in the OS keychain
        #[arg(long)]
        remember: bool,
    },

    /// End the session
    Logout {
        /// Also delete the remembered password
        #[arg(long)]
        forget: bool,
    },

    /// Show upcoming events as map markers
    Map,

    /// Show the details of an event
    Show {
        /// Event id
        id: String,
    },

    /// Volunteer for an event
    Volunteer {
        /// Event id
        id: String,
    },

    /// Print a message to share an event
    Share {
        /// Event id
        id: String,
    },

    /// Upload an image and print its public URL
    Upload {
        /// Image file
        path: PathBuf,
    },

    /// Create a new event
    Create(CreateArgs),
}

#[derive(Args)]
pub struct CreateArgs {
    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub description: String,

    /// Date as YYYY-MM-DD
    #[arg(long)]
    pub date: String,

    /// Time as HH:MM
    #[arg(long)]
    pub time: String,

    #[arg(long, allow_hyphen_values = true)]
    pub latitude: String,

    #[arg(long, allow_hyphen_values = true)]
    pub longitude: String,

    /// Number of volunteers needed
    #[arg(long)]
    pub volunteers: String,

    /// Image file to upload for the event
    #[arg(long, conflicts_with = "image_url")]
    pub image: Option<PathBuf>,

    /// URL of an image that is already hosted
    #[arg(long)]
    pub image_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_create() {
        let cli = Cli::try_parse_from([
            "volunteer-map",
            "create",
            "--name",
            "Beach cleanup",
            "--description",
            "Bring gloves",
            "--date",
            "2030-01-01",
            "--time",
            "09:30",
            "--latitude",
            "-3.73",
            "--longitude",
            "-38.52",
            "--volunteers",
            "5",
            "--image",
            "photo.jpg",
        ])
        .unwrap();

        match cli.command {
            Commands::Create(args) => {
                assert_eq!(args.latitude, "-3.73");
                assert_eq!(args.longitude, "-38.52");
                assert_eq!(args.image, Some(PathBuf::from("photo.jpg")));
                assert!(args.image_url.is_none());
            }
            _ => panic!("expected create"),
        }
    }

    #[test]
    fn test_image_and_image_url_conflict() {
        let result = Cli::try_parse_from([
            "volunteer-map",
            "create",
            "--name", "n",
            "--description", "d",
            "--date", "2030-01-01",
            "--time", "09:30",
            "--latitude", "0",
            "--longitude", "0",
            "--volunteers", "1",
            "--image", "a.jpg",
            "--image-url", "https://x/y.jpg",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_login() {
        let cli = Cli::try_parse_from(["volunteer-map", "login", "--email", "a@b.c", "--remember"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Login { email: Some(ref e), remember: true } if e == "a@b.c"
        ));
    }
}
