use serde_json::{Value, json};

use super::prompt_builder::GenerationParams;

/// Wire dialect of a provider: how the request body is framed and where the
/// generated code sits in the response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    /// Prediction APIs answering `{ "output": "..." }`, where `output` may also
    /// be a list of streamed chunks.
    Output,
    /// Hugging Face style inference answering `[{ "generated_text": "..." }]`
    /// or a bare object with the same field.
    GeneratedText,
    /// OpenAI style chat completions answering `{ "choices": [...] }`.
    ChatCompletion,
}

impl ResponseShape {
    pub fn request_body(self, model_id: &str, prompt: &str, params: GenerationParams) -> Value {
        match self {
            Self::Output => json!({
                "input": {
                    "prompt": prompt,
                    "max_new_tokens": params.max_tokens,
                    "temperature": params.temperature,
                    "top_p": params.top_p,
                }
            }),
            Self::GeneratedText => json!({
                "inputs": prompt,
                "parameters": {
                    "max_new_tokens": params.max_tokens,
                    "temperature": params.temperature,
                    "top_p": params.top_p,
                    "return_full_text": false,
                }
            }),
            Self::ChatCompletion => json!({
                "model": model_id,
                "messages": [{ "role": "user", "content": prompt }],
                "max_tokens": params.max_tokens,
                "temperature": params.temperature,
                "top_p": params.top_p,
            }),
        }
    }

    /// Pulls the generated text out of a decoded response body. `None` means the
    /// payload did not carry text where this dialect puts it.
    pub fn extract_code(self, raw: &Value) -> Option<String> {
        match self {
            Self::Output => extract_output(raw.get("output")?),
            Self::GeneratedText => {
                let entry = match raw {
                    Value::Array(entries) => entries.first()?,
                    other => other,
                };
                entry
                    .get("generated_text")
                    .and_then(Value::as_str)
                    .map(ToOwned::to_owned)
            }
            Self::ChatCompletion => {
                let choice = raw.get("choices")?.as_array()?.first()?;
                if let Some(content) = choice.pointer("/message/content") {
                    return extract_message_content(content);
                }
                choice
                    .get("text")
                    .and_then(Value::as_str)
                    .map(ToOwned::to_owned)
            }
        }
    }
}

fn extract_output(output: &Value) -> Option<String> {
    match output {
        Value::String(text) => Some(text.clone()),
        Value::Array(chunks) => Some(chunks.iter().filter_map(Value::as_str).collect()),
        _ => None,
    }
}

fn extract_message_content(content: &Value) -> Option<String> {
    match content {
        Value::String(text) => Some(text.clone()),
        Value::Array(parts) => Some(
            parts
                .iter()
                .filter_map(|part| match part {
                    Value::String(text) => Some(text.as_str()),
                    Value::Object(map) => map.get("text").and_then(Value::as_str),
                    _ => None,
                })
                .collect(),
        ),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::ResponseShape;
    use crate::infra::llm::prompt_builder::GenerationParams;

    #[test]
    fn output_shape_reads_string_and_chunked_output() {
        let single = json!({ "output": "def reverse(s): return s[::-1]" });
        let chunked = json!({ "output": ["def reverse(s):", " return s[::-1]"] });

        assert_eq!(
            ResponseShape::Output.extract_code(&single).as_deref(),
            Some("def reverse(s): return s[::-1]")
        );
        assert_eq!(
            ResponseShape::Output.extract_code(&chunked).as_deref(),
            Some("def reverse(s): return s[::-1]")
        );
        assert_eq!(ResponseShape::Output.extract_code(&json!({})), None);
    }

    #[test]
    fn generated_text_shape_reads_array_or_object() {
        let listed = json!([{ "generated_text": "fn main() {}" }]);
        let bare = json!({ "generated_text": "fn main() {}" });

        assert_eq!(
            ResponseShape::GeneratedText.extract_code(&listed).as_deref(),
            Some("fn main() {}")
        );
        assert_eq!(
            ResponseShape::GeneratedText.extract_code(&bare).as_deref(),
            Some("fn main() {}")
        );
        assert_eq!(ResponseShape::GeneratedText.extract_code(&json!([])), None);
    }

    #[test]
    fn chat_completion_shape_reads_message_content_parts_or_text() {
        let message = json!({
            "choices": [{ "message": { "role": "assistant", "content": "print(1)" } }]
        });
        let parts = json!({
            "choices": [{ "message": { "content": [
                { "type": "text", "text": "print(" },
                { "type": "text", "text": "1)" }
            ] } }]
        });
        let legacy = json!({ "choices": [{ "text": "print(1)" }] });

        for raw in [message, parts, legacy] {
            assert_eq!(
                ResponseShape::ChatCompletion.extract_code(&raw).as_deref(),
                Some("print(1)")
            );
        }
        assert_eq!(
            ResponseShape::ChatCompletion.extract_code(&json!({ "choices": [] })),
            None
        );
    }

    #[test]
    fn request_body_frames_prompt_per_dialect() {
        let params = GenerationParams::default();

        let output = ResponseShape::Output.request_body("codellama", "p", params);
        assert_eq!(output["input"]["prompt"], "p");
        assert_eq!(output["input"]["max_new_tokens"], 500);
        assert_eq!(output["input"]["temperature"], 0.7);
        assert_eq!(output["input"]["top_p"], 0.95);

        let generated = ResponseShape::GeneratedText.request_body("starcoder", "p", params);
        assert_eq!(generated["inputs"], "p");
        assert_eq!(generated["parameters"]["return_full_text"], false);

        let chat = ResponseShape::ChatCompletion.request_body("gpt-3.5-turbo", "p", params);
        assert_eq!(chat["model"], "gpt-3.5-turbo");
        assert_eq!(chat["messages"][0]["content"], "p");
        assert_eq!(chat["max_tokens"], 500);
        assert_eq!(chat["temperature"], 0.7);
        assert_eq!(
            serde_json::to_string(&chat["top_p"]).expect("top_p should serialize"),
            "0.95"
        );
    }
}
