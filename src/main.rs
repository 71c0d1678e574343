use std::{env, fs, path::Path, process};

use mds_parser::{MdsError, MdsResult, ModelScript, ScriptFormat};

const USAGE: &str = "usage: mds_parser <input.mds|input.msb> <output.mds|output.msb|output.json>";

fn convert(input: &str, output: &str) -> MdsResult<()> {
    let script = ModelScript::from_path(input)?;

    let out_path = Path::new(output);
    let model_name = out_path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or_default();
    let extension = out_path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();

    let data = match extension.as_str() {
        "msb" => script.generate(model_name, ScriptFormat::Binary)?,
        "mds" => script.generate(model_name, ScriptFormat::Source)?,
        "json" => serde_json::to_vec_pretty(&script).map_err(|e| MdsError::WriteFailure {
            reason: e.to_string(),
        })?,
        other => {
            return Err(MdsError::WriteFailure {
                reason: format!("unsupported output extension '{}'", other),
            })
        },
    };

    fs::write(output, data).map_err(|e| MdsError::WriteFailure {
        reason: format!("{}: {}", output, e),
    })?;

    println!(
        "converted {} -> {} ({} animations, {} aliases, {} blends)",
        input,
        output,
        script.animations.len(),
        script.aliases.len(),
        script.blends.len()
    );
    Ok(())
}

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() != 3 {
        eprintln!("{}", USAGE);
        process::exit(2);
    }

    if let Err(e) = convert(&args[1], &args[2]) {
        eprintln!("error {} ({}): {}", e.code(), e.category(), e);
        process::exit(1);
    }
}
