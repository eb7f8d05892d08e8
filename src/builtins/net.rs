use log::debug;

use crate::runtime::{CallContext, RuntimeError, Value};

use super::{NativeFn, string_arg};

pub(super) const FUNCTIONS: &[(&str, NativeFn)] = &[("http_get", http_get), ("http_post", http_post)];

fn http_get(context: &mut dyn CallContext, args: Vec<Value>) -> Result<Value, RuntimeError> {
    RuntimeError::expect_arity("http_get", 1, args.len())?;
    let url = string_arg("http_get", &args, 0)?;
    debug!("GET {url}");
    let response = context.http_agent().get(url).call();
    read_body("http_get", response)
}

fn http_post(context: &mut dyn CallContext, args: Vec<Value>) -> Result<Value, RuntimeError> {
    RuntimeError::expect_arity("http_post", 2, args.len())?;
    let url = string_arg("http_post", &args, 0)?;
    let body = string_arg("http_post", &args, 1)?;
    debug!("POST {url} ({} bytes)", body.len());
    let response = context.http_agent().post(url).send_string(body);
    read_body("http_post", response)
}

fn read_body(
    name: &str,
    response: Result<ureq::Response, ureq::Error>,
) -> Result<Value, RuntimeError> {
    let response = match response {
        Ok(response) => response,
        Err(ureq::Error::Status(code, _)) => {
            return Err(RuntimeError::builtin(name, format!("HTTP status {code}")));
        }
        Err(error) => return Err(RuntimeError::builtin(name, error)),
    };
    let body = response
        .into_string()
        .map_err(|error| RuntimeError::builtin(name, error))?;
    Ok(Value::string(body))
}
