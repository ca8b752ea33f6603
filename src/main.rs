use clap::Parser;
use screen_analysis::cli::commands::{cmd_analyze, cmd_crop, cmd_detect, cmd_match, cmd_visualize};
use screen_analysis::cli::config::{Cli, Commands, load_config, log_level};
use screen_analysis::screen::screen_model::Rect;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // RUST_LOG > -v count
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level(cli.verbose)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(cli.config.as_deref());

    match cli.command {
        Commands::Detect {
            image,
            filter,
            blur,
            min_area,
            output,
        } => {
            cmd_detect(&config, &image, filter, blur, min_area, output.as_deref())?;
        }
        Commands::Analyze {
            image,
            ocr_tokens,
            ocr_endpoint,
            trace,
            output,
        } => {
            cmd_analyze(
                &config,
                &image,
                ocr_tokens.as_deref(),
                ocr_endpoint.as_deref(),
                trace.as_deref(),
                output.as_deref(),
            )?;
        }
        Commands::Match {
            image,
            template,
            threshold,
            max_results,
            timeout_ms,
            output,
        } => {
            cmd_match(
                &config,
                &image,
                &template,
                threshold,
                max_results,
                timeout_ms,
                output.as_deref(),
            )?;
        }
        Commands::Visualize {
            image,
            output,
            thickness,
            show_centers,
        } => {
            cmd_visualize(&config, &image, &output, thickness, show_centers)?;
        }
        Commands::Crop {
            image,
            x,
            y,
            width,
            height,
            output,
        } => {
            cmd_crop(&image, Rect::new(x, y, width, height), &output)?;
        }
    }

    Ok(())
}
