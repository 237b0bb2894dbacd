use std::io::{self, Write};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cardtone::cli::Args;
use cardtone::engine::{Completion, Engine, ImageRef, Side};
use cardtone::pipeline::analyze;
use cardtone::pipeline::extract::load_image;
use cardtone::pipeline::sample::Raster;
use cardtone::preview;
use cardtone::session::Session;
use cardtone::theme::CardTheme;

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cardtone=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr).without_time())
        .init();

    let args = Args::parse();
    let config = args.engine_config();

    if args.interactive {
        let mut session = Session::new(config).context("invalid configuration")?;
        if let Some(path) = &args.image {
            session.execute(
                cardtone::session::Command::Image(path.clone()),
                &mut io::sink(),
            )?;
        }
        let stdin = io::stdin();
        let mut stdout = io::stdout();
        return session.run(stdin.lock(), &mut stdout);
    }

    let Some(path) = args.image.as_deref() else {
        anyhow::bail!("an image path is required");
    };

    let mut engine = Engine::new(config).context("invalid configuration")?;
    if let Some(ticket) = engine.image_changed(ImageRef::from(path)) {
        let result = load_image(path)
            .and_then(|image| analyze(&Raster::from_image(&image), &config.analysis));
        engine.analysis_completed(Completion {
            generation: ticket.generation,
            result,
        });
    }
    if let Some(err) = engine.last_error() {
        eprintln!("cardtone: {err}; using default colors");
    }

    for _ in 0..args.shuffle {
        if let Err(e) = engine.regenerate() {
            tracing::warn!(error = %e, "shuffle skipped");
            break;
        }
    }

    let overrides = [
        (Side::Background, args.background),
        (Side::Foreground, args.foreground),
    ];
    for (side, color) in overrides {
        let Some(color) = color else { continue };
        if engine.auto_mode() {
            engine.toggle_auto();
        }
        engine.set_manual_color(side, color)?;
    }

    let theme = CardTheme::from_snapshot(&engine.snapshot());

    if args.preview {
        let mut stdout = io::stdout();
        preview::render(&mut stdout, &theme).context("failed to print preview")?;
    }

    match &args.output {
        Some(out) => {
            theme.write_to(out)?;
            eprintln!("Theme written to {}", out.display());
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(theme.serialize().as_bytes())
                .context("failed to write theme")?;
        }
    }

    Ok(())
}
