// CLI argument definitions using clap

use clap::{Parser, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "gcs-resizer")]
#[command(author = "hatlonely <hatlonely@foxmail.com>")]
#[command(version = "0.1.0")]
#[command(
    about = "List a Cloud Storage bucket, resize the target image and upload a test object",
    long_about = None
)]
pub struct Cli {
    /// Bucket to work on (default: store.bucket from the config file)
    pub bucket: Option<String>,

    /// Path to config file (default: ~/.gcs-resizer/config.yaml)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log level or filter directive, overrides log.level
    #[arg(long)]
    pub log_level: Option<String>,

    /// Where to read the image from, overrides pipeline.image_source
    #[arg(long, value_enum)]
    pub source: Option<SourceArg>,

    /// Skip the test object upload
    #[arg(long)]
    pub no_test_upload: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceArg {
    /// Unauthenticated GET on the object's public URL
    PublicUrl,
    /// Read through the storage API with the configured credentials
    Authenticated,
}
