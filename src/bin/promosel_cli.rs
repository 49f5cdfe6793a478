use promosel::engine::{
    EngineConfig, QualityFilter, SelectedPromoter, SelectionEngine, SelectionOrder,
    SelectionRequest,
};
use serde::Serialize;
use std::{env, fs};

#[derive(Serialize)]
struct SelectionResponse {
    filename: String,
    top_sequences: Vec<SelectedPromoter>,
    selected: Vec<SelectedPromoter>,
}

fn usage() {
    eprintln!(
        "Usage:\n  \
  promosel_cli --target STRENGTH --count N [options]\n\n\
Options:\n  \
  --target STRENGTH    target promoter strength, above 0 and at most 100\n  \
  --count N            number of promoters to select, 1 to 100\n  \
  --project NAME       project label written into the result file\n  \
  --catalog PATH       promoter catalog CSV (default data/all_promoters.csv)\n  \
  --output-dir PATH    directory for result files (default output)\n  \
  --filter none|threshold\n                       drop promoters with quality score <= 80 (default none)\n  \
  --order ranked|shuffled\n                       output order of the saved selection (default ranked)\n  \
  --seed N             fixed seed for the shuffled order"
    );
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args: Vec<String> = env::args().collect();
    if args.len() <= 1 {
        usage();
        return Err("Missing arguments".to_string());
    }

    let mut config = EngineConfig::default();
    let mut target_strength: Option<f64> = None;
    let mut count: Option<usize> = None;
    let mut project_name = String::new();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                usage();
                return Ok(());
            }
            "--target" => {
                target_strength = Some(
                    arg_value(&args, &mut i)?
                        .parse::<f64>()
                        .map_err(|e| format!("Invalid --target value: {e}"))?,
                );
            }
            "--count" => {
                count = Some(
                    arg_value(&args, &mut i)?
                        .parse::<usize>()
                        .map_err(|e| format!("Invalid --count value: {e}"))?,
                );
            }
            "--project" => project_name = arg_value(&args, &mut i)?,
            "--catalog" => config.catalog_path = arg_value(&args, &mut i)?,
            "--output-dir" => config.output_dir = arg_value(&args, &mut i)?,
            "--filter" => {
                config.quality_filter = match arg_value(&args, &mut i)?.as_str() {
                    "none" => QualityFilter::None,
                    "threshold" => QualityFilter::Threshold,
                    other => {
                        return Err(format!(
                            "Unknown filter '{other}', expected 'none' or 'threshold'"
                        ));
                    }
                };
            }
            "--order" => {
                config.selection_order = match arg_value(&args, &mut i)?.as_str() {
                    "ranked" => SelectionOrder::Ranked,
                    "shuffled" => SelectionOrder::Shuffled,
                    other => {
                        return Err(format!(
                            "Unknown order '{other}', expected 'ranked' or 'shuffled'"
                        ));
                    }
                };
            }
            "--seed" => {
                config.shuffle_seed = Some(
                    arg_value(&args, &mut i)?
                        .parse::<u64>()
                        .map_err(|e| format!("Invalid --seed value: {e}"))?,
                );
            }
            other => {
                usage();
                return Err(format!("Unknown argument '{other}'"));
            }
        }
        i += 1;
    }

    let target_strength = target_strength.ok_or_else(|| {
        usage();
        "Missing --target".to_string()
    })?;
    let count = count.ok_or_else(|| {
        usage();
        "Missing --count".to_string()
    })?;

    fs::create_dir_all(&config.output_dir)
        .map_err(|e| format!("Could not create output directory '{}': {e}", config.output_dir))?;

    let engine = SelectionEngine::new(config);
    let outcome = engine
        .select(&SelectionRequest {
            project_name,
            target_strength,
            count,
        })
        .map_err(|e| e.to_string())?;

    print_json(&SelectionResponse {
        filename: outcome.artifact_name,
        top_sequences: outcome.preview,
        selected: outcome.selection,
    })
}

fn arg_value(args: &[String], i: &mut usize) -> Result<String, String> {
    let flag = args[*i].clone();
    *i += 1;
    args.get(*i)
        .cloned()
        .ok_or_else(|| format!("Missing value for '{flag}'"))
}

fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| format!("Could not serialize JSON output: {e}"))?;
    println!("{text}");
    Ok(())
}
