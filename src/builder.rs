use std::fs::File;
use std::path::Path;

use anyhow::Context;
use tracing::{debug, warn};

use crate::cli::{Args, ImageCommand};
use crate::format::{ImageError, Stream};
use crate::writer::stream::Scratch;
use crate::writer::{pad_image, pak3_image, stc_image, ImageReport};

/// Runs one image command. On failure after the destination was created,
/// a partially written regular file is removed before the error is returned.
///
/// # Errors
/// The returned error already carries the offending path as context.
pub fn run(args: Args) -> anyhow::Result<()> {
    let source = args.command.source();
    let destination = args.command.destination();
    let spec = args.command.target_spec();

    if !args.quiet {
        println!(
            "# Padding {} to {} KB {} into {}",
            source.display(),
            spec.target_size / 1024,
            spec.kind.description(),
            destination.display()
        );
    }

    let report = build(&args.command)?;

    if !args.quiet {
        match report.free_bytes {
            Some(free) => println!("# {} done ({free} bytes free)", destination.display()),
            None => println!("# {} done", destination.display()),
        }
    }
    Ok(())
}

fn build(command: &ImageCommand) -> anyhow::Result<ImageReport> {
    let source = command.source();
    let destination = command.destination();

    let mut input = File::open(source)
        .map_err(|error| ImageError::Open {
            stream: Stream::Source,
            error,
        })
        .with_context(|| source.display().to_string())?;

    let mut output = File::create(destination)
        .map_err(|error| ImageError::Open {
            stream: Stream::Destination,
            error,
        })
        .with_context(|| destination.display().to_string())?;
    // FIFOs and device nodes are written through but never synced or removed.
    let regular = output.metadata().is_ok_and(|meta| meta.is_file());

    let mut scratch = Scratch::new();
    let written = match command {
        ImageCommand::Pad { size, .. } => pad_image(*size, &mut input, &mut output, &mut scratch),
        ImageCommand::Pak3 { .. } => pak3_image(&mut input, &mut output, &mut scratch),
        ImageCommand::Stc { .. } => stc_image(&mut input, &mut output, &mut scratch),
    };
    let result = written.and_then(|report| close_output(output, regular).map(|()| report));

    match result {
        Ok(report) => {
            debug!(
                kind = ?report.kind,
                source_size = report.source_size,
                target_size = report.target_size,
                "image written"
            );
            Ok(report)
        }
        Err(err) => {
            if regular {
                discard_output(destination);
            }
            let path = match err.stream() {
                Some(Stream::Destination) => destination,
                _ => source,
            };
            Err(anyhow::Error::new(err).context(path.display().to_string()))
        }
    }
}

/// `File` has no user-space buffer; syncing is where a deferred write error
/// of a regular file surfaces.
fn close_output(output: File, regular: bool) -> Result<(), ImageError> {
    if regular {
        output.sync_all().map_err(|error| ImageError::Close {
            stream: Stream::Destination,
            error,
        })?;
    }
    Ok(())
}

fn discard_output(destination: &Path) {
    debug!(path = %destination.display(), "removing partial output");
    if let Err(err) = std::fs::remove_file(destination) {
        warn!(path = %destination.display(), error = %err, "could not remove partial output");
    }
}
