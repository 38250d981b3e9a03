use tokio::io::{AsyncReadExt, AsyncWriteExt};

use codec_csv::CsvResultCodec;
use result_api::result_set_from_json;

use super::config::{Effective, STDIN};
use super::error::ExportError;

// ═══════════════════════════════════════════════════════════════
//  Main dispatch
// ═══════════════════════════════════════════════════════════════

pub async fn run(args: &Effective) -> Result<(), ExportError> {
    let raw = read_input(&args.input).await?;
    let response: serde_json::Value = serde_json::from_str(&raw)?;

    let result = result_set_from_json(&response, &args.fields)?;
    tracing::info!(input = %args.input, rows = result.len(), "loaded result set");

    let csv = CsvResultCodec::new(args.options).encode(&result)?;

    match &args.output {
        Some(path) => {
            tokio::fs::write(path, csv.as_bytes()).await?;
            tracing::info!(output = %path, bytes = csv.len(), "wrote CSV");
        }
        None => {
            let mut stdout = tokio::io::stdout();
            stdout.write_all(csv.as_bytes()).await?;
            stdout.write_all(b"\n").await?;
            stdout.flush().await?;
        }
    }
    Ok(())
}

async fn read_input(input: &str) -> Result<String, ExportError> {
    if input == STDIN {
        let mut raw = String::new();
        tokio::io::stdin().read_to_string(&mut raw).await?;
        Ok(raw)
    } else {
        tokio::fs::read_to_string(input)
            .await
            .map_err(|source| ExportError::Input { path: input.to_string(), source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use result_api::FormatOptions;

    fn temp_path(name: &str) -> String {
        std::env::temp_dir()
            .join(format!("csv-export-{}-{name}", std::process::id()))
            .to_string_lossy()
            .into_owned()
    }

    #[tokio::test]
    async fn renders_file_to_file() {
        let input = temp_path("hits.json");
        let output = temp_path("hits.csv");
        tokio::fs::write(
            &input,
            r#"{"hits":{"hits":[{"_id":"1","_source":{"firstname":"Amber","age":32}}]}}"#,
        )
        .await
        .unwrap();

        let eff = Effective {
            input: input.clone(),
            output: Some(output.clone()),
            fields: vec!["age".into(), "firstname".into()],
            options: FormatOptions { include_id: true, ..FormatOptions::default() },
        };
        run(&eff).await.unwrap();

        let csv = tokio::fs::read_to_string(&output).await.unwrap();
        assert_eq!(csv, "age,firstname,_id\n32,Amber,1");

        let _ = tokio::fs::remove_file(&input).await;
        let _ = tokio::fs::remove_file(&output).await;
    }

    #[tokio::test]
    async fn missing_input_is_reported() {
        let eff = Effective {
            input: temp_path("does-not-exist.json"),
            output: None,
            fields: Vec::new(),
            options: FormatOptions::default(),
        };
        let err = run(&eff).await.unwrap_err();
        assert!(matches!(err, ExportError::Input { .. }));
    }

    #[tokio::test]
    async fn malformed_source_is_a_format_error() {
        let input = temp_path("bad.json");
        tokio::fs::write(&input, r#"{"hits":{"hits":[{"_source":[1,2]}]}}"#).await.unwrap();

        let eff = Effective { input: input.clone(), output: None, fields: Vec::new(), options: FormatOptions::default() };
        let err = run(&eff).await.unwrap_err();
        assert!(matches!(err, ExportError::Format(_)));

        let _ = tokio::fs::remove_file(&input).await;
    }
}
