//! Report and plan writers (made by FontLab https://www.fontlab.com/)

use std::io::Write;

use anyhow::{Context, Result};
use serde::Serialize;

/// One indented JSON document, newline-terminated so shells print a clean prompt.
pub fn write_json_pretty<T: Serialize + ?Sized>(value: &T, mut w: impl Write) -> Result<()> {
    serde_json::to_writer_pretty(&mut w, value).context("serializing JSON output")?;
    writeln!(w)?;
    w.flush()?;
    Ok(())
}

/// Newline-delimited JSON, one compact record per item; the writer is
/// flushed once all records are out.
pub fn write_ndjson<I>(items: I, mut w: impl Write) -> Result<()>
where
    I: IntoIterator,
    I::Item: Serialize,
{
    for (index, item) in items.into_iter().enumerate() {
        serde_json::to_writer(&mut w, &item)
            .with_context(|| format!("serializing NDJSON record {index}"))?;
        writeln!(w)?;
    }
    w.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use std::path::PathBuf;

    #[derive(Serialize)]
    struct Entry {
        kind: &'static str,
        path: PathBuf,
    }

    #[test]
    fn ndjson_writes_one_record_per_input() {
        let entries = [
            Entry {
                kind: "source",
                path: PathBuf::from("src/hexcraft/App.ts"),
            },
            Entry {
                kind: "loader",
                path: PathBuf::from("src/lib/threejs/examples/jsm/loaders/GLTFLoader.js"),
            },
        ];
        let mut buf = Vec::new();

        write_ndjson(&entries, &mut buf).expect("write ndjson");

        let text = String::from_utf8(buf).expect("utf8");
        let records: Vec<Value> = text
            .lines()
            .map(|line| serde_json::from_str(line).expect("json line"))
            .collect();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["kind"], "source");
        assert_eq!(records[0]["path"], "src/hexcraft/App.ts");
        assert_eq!(records[1]["kind"], "loader");
    }

    #[test]
    fn pretty_json_ends_with_newline() {
        let mut buf = Vec::new();
        write_json_pretty(&["dist"], &mut buf).expect("write json");
        assert_eq!(String::from_utf8(buf).unwrap(), "[\n  \"dist\"\n]\n");
    }
}
