//! Command-line interface for the Resolute resource resolution engine.

mod commands;
mod format;

use clap::{Parser, Subcommand, ValueEnum};
use format::Style;

#[derive(Parser, Debug)]
#[command(name = "resolute", version, about = "Conditional resource resolution engine CLI")]
struct Cli {
    /// Output format for command results.
    #[arg(long, value_enum, default_value_t = OutputFormat::Pretty, global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Pretty-printed JSON.
    Pretty,
    /// Single-line compact JSON.
    Compact,
}

impl From<OutputFormat> for Style {
    fn from(value: OutputFormat) -> Self {
        match value {
            OutputFormat::Pretty => Style::Pretty,
            OutputFormat::Compact => Style::Compact,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compile a declarative resource corpus into a checksum-sealed bundle.
    Build {
        /// Built-in system configuration profile name.
        #[arg(long, default_value = "default")]
        config: String,
        /// Path to a JSON file containing an array of resource declarations.
        #[arg(long)]
        input: String,
        /// Path to write the resulting bundle JSON to.
        #[arg(long)]
        output: String,
        /// Run the order-independent normalization pass before checksumming.
        #[arg(long, default_value_t = true)]
        normalize: bool,
        /// Optional version tag recorded in bundle metadata.
        #[arg(long)]
        version: Option<String>,
        /// Optional description recorded in bundle metadata.
        #[arg(long)]
        description: Option<String>,
    },
    /// Resolve a resource id against a context, reading a previously built bundle.
    Resolve {
        /// Path to the bundle JSON file.
        #[arg(long)]
        bundle: String,
        /// Resource id to resolve.
        #[arg(long)]
        resource: String,
        /// Context entries as `qualifier=value` pairs (repeatable).
        #[arg(long = "set", value_name = "QUALIFIER=VALUE")]
        context: Vec<String>,
        /// Skip bundle checksum verification on load.
        #[arg(long, default_value_t = false)]
        skip_checksum_verification: bool,
    },
    /// Verify a bundle's integrity without resolving anything.
    Verify {
        /// Path to the bundle JSON file.
        #[arg(long)]
        bundle: String,
    },
}

fn main() -> std::process::ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let style: Style = cli.format.into();

    let result = match cli.command {
        Commands::Build {
            config,
            input,
            output,
            normalize,
            version,
            description,
        } => commands::build(&config, &input, &output, normalize, version, description, style),
        Commands::Resolve {
            bundle,
            resource,
            context,
            skip_checksum_verification,
        } => commands::resolve(&bundle, &resource, &context, skip_checksum_verification, style),
        Commands::Verify { bundle } => commands::verify(&bundle, style),
    };

    match result {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(%err, "command failed");
            eprintln!("{}", style.render_error(&format!("{err:#}")));
            std::process::ExitCode::FAILURE
        }
    }
}
