//! Request construction for the system under test.
//!
//! The SUT's request shape is unknown, so the question is duplicated under
//! several common field names at once; a SUT that understands any one of
//! them will answer. GET targets receive the same fields as query
//! parameters instead of a body.

use crate::config::{EvalConfig, HttpMethod};
use serde_json::{json, Value};

/// Field names the question is duplicated under.
const QUESTION_FIELDS: [&str; 4] = ["query", "question", "pregunta", "message"];

/// JSON body carrying the question under every known field name.
pub fn question_payload(question: &str) -> Value {
    let mut map = serde_json::Map::new();
    for field in QUESTION_FIELDS {
        map.insert(field.to_string(), json!(question));
    }
    Value::Object(map)
}

/// Build the SUT request: method, endpoint, ordered headers, and the
/// question payload as body or query string depending on the method.
pub fn build_request(
    client: &reqwest::Client,
    config: &EvalConfig,
    question: &str,
) -> reqwest::RequestBuilder {
    let mut req = client.request(config.sut.method.as_reqwest(), config.sut.endpoint());

    for header in &config.sut.headers {
        req = req.header(&header.name, &header.value);
    }

    match config.sut.method {
        HttpMethod::Get => {
            let pairs: Vec<(&str, &str)> =
                QUESTION_FIELDS.iter().map(|f| (*f, question)).collect();
            req.query(&pairs)
        }
        HttpMethod::Post | HttpMethod::Put => req.json(&question_payload(question)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_duplicates_question_under_all_fields() {
        let payload = question_payload("hola");
        for field in QUESTION_FIELDS {
            assert_eq!(payload[field], "hola");
        }
    }
}
