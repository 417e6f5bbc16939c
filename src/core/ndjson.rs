// Newline delimited JSON encoding of a result set.
//
// One compact JSON object per line, in input order, no wrapping array and no
// trailing newline. An empty result set encodes to an empty body.

use crate::core::ports::Record;

pub const CONTENT_TYPE: &str = "application/x-ndjson";

pub fn encode(records: &[Record]) -> Result<String, serde_json::Error> {
    let lines = records
        .iter()
        .map(serde_json::to_string)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(lines.join("\n"))
}
