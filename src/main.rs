// Resume field localization demo: match extracted fields back onto the
// document and write annotated proof images.

use clap::Parser;
use resumark::{annotate_resume, AnnotationOutcome};
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "resumark")]
#[command(about = "Annotate a resume image or PDF with the locations of its extracted fields")]
struct Args {
    /// Resume file (PDF or image)
    resume: PathBuf,

    /// Extraction record JSON produced by the parsing stage
    record: PathBuf,

    /// Directory for the annotated images
    #[arg(short, long, default_value = "annotations")]
    output_dir: PathBuf,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    println!("Resume Annotation");
    println!("-----------------");
    println!("Document: {}", args.resume.display());
    println!("Record:   {}", args.record.display());

    match annotate_resume(&args.resume, &args.record, &args.output_dir) {
        Ok(outcome) => {
            match &outcome {
                AnnotationOutcome::PerPage { .. } => {
                    println!("\nAnnotated page by page:");
                }
                AnnotationOutcome::Whole { fallback: None, .. } => {
                    println!("\nAnnotated as whole document:");
                }
                AnnotationOutcome::Whole {
                    fallback: Some(reason),
                    ..
                } => {
                    println!("\nPer-page annotation failed ({reason});");
                    println!("fell back to whole-document annotation:");
                }
            }
            for path in outcome.outputs() {
                println!("  - {}", path.display());
            }
            if outcome.outputs().is_empty() {
                println!("  (no pages produced output)");
            }
        }
        Err(err) => {
            eprintln!("Annotation failed: {err}");
            process::exit(1);
        }
    }
}
