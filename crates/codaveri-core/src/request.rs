//! Submission payload sent to `POST /execute`

use serde::{Deserialize, Serialize};

use crate::languages::{Language, LanguageDescriptor};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    pub path: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageVersion {
    pub language: Language,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IoTestcase {
    pub index: u32,
    pub input: String,
    pub output: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Testcases {
    #[serde(rename = "IOTestcases")]
    pub io_testcases: Vec<IoTestcase>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteRequest {
    pub files: Vec<SourceFile>,
    pub language_version: LanguageVersion,
    pub testcases: Testcases,
}

impl ExecuteRequest {
    /// Single-file, single-run request. The code is passed through untouched;
    /// size limits are enforced by the backend.
    pub fn build(code: &str, descriptor: &LanguageDescriptor) -> Self {
        Self {
            files: vec![SourceFile {
                path: descriptor.path.to_string(),
                content: code.to_string(),
            }],
            language_version: LanguageVersion {
                language: descriptor.language,
                version: descriptor.version.to_string(),
            },
            testcases: Testcases {
                io_testcases: vec![IoTestcase {
                    index: 1,
                    input: String::new(),
                    output: String::new(),
                }],
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::languages::resolve;
    use serde_json::json;

    #[test]
    fn test_build_python_request() {
        let request = ExecuteRequest::build("print(\"hi\")", &resolve("python").unwrap());

        assert_eq!(request.files.len(), 1);
        assert_eq!(request.files[0].path, "main.py");
        assert_eq!(request.files[0].content, "print(\"hi\")");
        assert_eq!(request.language_version.language, Language::Python);
        assert_eq!(request.language_version.version, "3.12");
        assert_eq!(
            request.testcases.io_testcases,
            vec![IoTestcase { index: 1, input: String::new(), output: String::new() }]
        );
    }

    #[test]
    fn test_wire_format_matches_backend_field_names() {
        let request = ExecuteRequest::build("fn main() {}", &resolve("rust").unwrap());
        let encoded = serde_json::to_value(&request).unwrap();

        assert_eq!(
            encoded,
            json!({
                "files": [{"path": "main.rs", "content": "fn main() {}"}],
                "languageVersion": {"language": "rust", "version": "1.68.2"},
                "testcases": {"IOTestcases": [{"index": 1, "input": "", "output": ""}]}
            })
        );
    }

    #[test]
    fn test_shape_is_independent_of_code_content() {
        let large = "x = 1\n".repeat(100_000);
        let samples = [
            "",
            large.as_str(),
            "print(\"quote \\\" backslash \\\\ tab \t newline \n\")",
            "console.log('\u{1F600} \u{0000} </script>')",
        ];

        for code in samples {
            let request = ExecuteRequest::build(code, &resolve("javascript").unwrap());
            assert_eq!(request.files.len(), 1);
            assert_eq!(request.testcases.io_testcases.len(), 1);

            let text = serde_json::to_string(&request).unwrap();
            let decoded: ExecuteRequest = serde_json::from_str(&text).unwrap();
            assert_eq!(decoded.files[0].content, code);
        }
    }
}
