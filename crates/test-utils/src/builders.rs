#![allow(dead_code)]

use serde_json::{Map, Value};

/// Builder for protocol request lines to simplify test setup.
pub struct RequestBuilder {
    fields: Map<String, Value>,
}

impl RequestBuilder {
    pub fn new(cmd: &str) -> Self {
        let mut fields = Map::new();
        fields.insert("cmd".to_string(), Value::from(cmd));
        Self { fields }
    }

    /// A request with no `cmd` at all.
    pub fn without_cmd() -> Self {
        Self { fields: Map::new() }
    }

    pub fn reference(mut self, reference: &str) -> Self {
        self.fields.insert("ref".to_string(), Value::from(reference));
        self
    }

    pub fn args(mut self, args: &[&str]) -> Self {
        let args = args.iter().map(|a| Value::from(*a)).collect();
        self.fields.insert("args".to_string(), Value::Array(args));
        self
    }

    pub fn lib_path(mut self, path: &str) -> Self {
        self.fields.insert("lib_path".to_string(), Value::from(path));
        self
    }

    pub fn msg(mut self, msg: &str) -> Self {
        self.fields.insert("msg".to_string(), Value::from(msg));
        self
    }

    /// The request as one JSON line, without the trailing newline.
    pub fn build(self) -> String {
        Value::Object(self.fields).to_string()
    }
}

pub fn create(args: &[&str]) -> String {
    RequestBuilder::new("create").args(args).build()
}

pub fn start(reference: &str) -> String {
    RequestBuilder::new("start").reference(reference).build()
}

pub fn iteration(reference: &str) -> String {
    RequestBuilder::new("iteration").reference(reference).build()
}

pub fn send_message(reference: &str, msg: &str) -> String {
    RequestBuilder::new("send_message")
        .reference(reference)
        .msg(msg)
        .build()
}

pub fn shutdown(reference: &str) -> String {
    RequestBuilder::new("shutdown").reference(reference).build()
}

/// Join request lines into a newline-terminated input stream.
pub fn script(lines: &[String]) -> Vec<u8> {
    let mut out = String::new();
    for line in lines {
        out.push_str(line);
        out.push('\n');
    }
    out.into_bytes()
}
