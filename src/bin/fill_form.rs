//! Fill a PDF form from JSON
//!
//! Reads field values from a JSON object and field policies from a JSON
//! manifest, fills the template and places any 3D assets.
//!
//! Usage:
//!   cargo run --release --bin fill_form -- --template form.pdf --output filled.pdf \
//!       --data record.json --fields manifest.json [--config config.json] [--fonts Fonts]

use std::path::PathBuf;

use pdf_filler::{FieldManifest, FillConfig, PdfBuilder};
use serde_json::{Map, Value};

struct FillArgs {
    template: PathBuf,
    output: PathBuf,
    data: PathBuf,
    fields: PathBuf,
    config: Option<PathBuf>,
    fonts: Option<PathBuf>,
}

impl FillArgs {
    fn from_args() -> Result<Self, String> {
        let args: Vec<String> = std::env::args().collect();
        let mut template = None;
        let mut output = None;
        let mut data = None;
        let mut fields = None;
        let mut config = None;
        let mut fonts = None;

        let mut i = 1;
        while i < args.len() {
            let slot = match args[i].as_str() {
                "--template" => &mut template,
                "--output" | "-o" => &mut output,
                "--data" => &mut data,
                "--fields" => &mut fields,
                "--config" => &mut config,
                "--fonts" => &mut fonts,
                other => return Err(format!("unknown argument '{}'", other)),
            };
            i += 1;
            match args.get(i) {
                Some(value) => *slot = Some(PathBuf::from(value)),
                None => return Err(format!("{} needs a value", args[i - 1])),
            }
            i += 1;
        }

        Ok(Self {
            template: template.ok_or("--template is required")?,
            output: output.ok_or("--output is required")?,
            data: data.ok_or("--data is required")?,
            fields: fields.ok_or("--fields is required")?,
            config,
            fonts,
        })
    }
}

fn run(args: &FillArgs) -> pdf_filler::Result<String> {
    let mut config = match &args.config {
        Some(path) => FillConfig::from_json_file(path)?,
        None => FillConfig::default(),
    };
    if let Some(fonts) = &args.fonts {
        config = config.with_font_folder(fonts);
    }

    let manifest = FieldManifest::from_json_file(&args.fields)?;
    let data: Map<String, Value> = serde_json::from_str(&std::fs::read_to_string(&args.data)?)?;

    let mut builder = PdfBuilder::open(&args.template, &args.output, config)?;
    let report = builder.fill_fields(&manifest.bind(&data))?;
    let assets = builder.place_deferred_assets()?;
    let output = builder.save()?;

    Ok(format!(
        "{}: {} fields, {} not in form, {} 3D assets placed, {} skipped",
        output.display(),
        report.len(),
        report.count(|o| *o == pdf_filler::FieldOutcome::NotInForm),
        assets.placed.len(),
        assets.skipped.len()
    ))
}

fn main() {
    env_logger::init();

    let args = match FillArgs::from_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!(
                "Usage: fill_form --template T --output O --data D.json --fields M.json [--config C.json] [--fonts DIR]"
            );
            std::process::exit(1);
        },
    };

    match run(&args) {
        Ok(summary) => println!("✓ {}", summary),
        Err(e) => {
            eprintln!("✗ Error: {}", e);
            std::process::exit(1);
        },
    }
}
