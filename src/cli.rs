use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the edge server and backend pings (default if no command specified)
    Serve {
        #[arg(short, long)]
        port: Option<u16>,

        #[arg(long)]
        host: Option<String>,
    },

    /// Show the blog listing
    Blogs {
        /// Only show cards in this category ("all" for everything)
        #[arg(short, long)]
        category: Option<String>,
    },

    /// Show one article with its related articles
    Blog { category: String, slug: String },

    /// Log in to the admin area
    Login {
        #[arg(short, long)]
        username: String,

        #[arg(short, long)]
        password: String,

        /// Go to the blogs panel instead of the dashboard
        #[arg(long)]
        blogs: bool,
    },

    /// Forget the stored admin session
    Logout,

    /// Show the stored admin session, redirecting if one exists
    Session,

    /// Authorized GET against the main API with the stored session
    Fetch {
        /// Absolute API path, e.g. /api/admin/profile
        path: String,
    },

    /// Ping both backends once
    Ping,

    /// Render course data from a JSON file
    Curriculum {
        file: PathBuf,

        /// Module tab to open, for files with a `tabs` list
        #[arg(short, long)]
        tab: Option<String>,
    },
}
