//! API utilities for frontend-backend communication
//!
//! Plain JSON calls return `Result<T, String>` for the views. Streamed calls
//! return `UseCaseResult` because the session controllers classify the
//! failure (transport, stream framing, server detail).

use contracts::domain::a005_attachment::UploadResponse;
use contracts::shared::sse::SseDecoder;
use contracts::usecases::common::{UseCaseError, UseCaseResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{FormData, ReadableStreamDefaultReader, Request, RequestInit, Response};

/// Base URL for API requests. The pages are served by the API host, so this
/// is the current origin.
pub fn api_base() -> String {
    web_sys::window()
        .and_then(|w| w.location().origin().ok())
        .unwrap_or_default()
}

/// Build a full API URL from a path
///
/// # Example
/// ```rust,ignore
/// let url = api_url("/api/skills?incluir_sistema=true");
/// ```
pub fn api_url(path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    format!("{}{}", api_base(), path)
}

fn build_request(method: &str, path: &str, body: Option<&JsValue>) -> Result<Request, String> {
    let opts = RequestInit::new();
    opts.set_method(method);
    if let Some(body) = body {
        opts.set_body(body);
    }
    let request =
        Request::new_with_str_and_init(&api_url(path), &opts).map_err(|e| format!("{e:?}"))?;
    request
        .headers()
        .set("Accept", "application/json")
        .map_err(|e| format!("{e:?}"))?;
    Ok(request)
}

async fn execute(request: Request) -> Result<Response, String> {
    let window = web_sys::window().ok_or_else(|| "no window".to_string())?;
    let resp_value = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(|e| format!("{e:?}"))?;
    resp_value.dyn_into().map_err(|e| format!("{e:?}"))
}

async fn read_text(resp: &Response) -> Result<String, String> {
    let text = JsFuture::from(resp.text().map_err(|e| format!("{e:?}"))?)
        .await
        .map_err(|e| format!("{e:?}"))?;
    text.as_string().ok_or_else(|| "bad text".to_string())
}

/// Reads the body and turns non-2xx answers into the server's detail.
async fn checked_text(resp: Response) -> Result<String, String> {
    let text = read_text(&resp).await?;
    if !resp.ok() {
        return Err(UseCaseError::from_http(resp.status(), &text).to_string());
    }
    Ok(text)
}

fn json_body<B: Serialize>(body: &B) -> Result<JsValue, String> {
    let json = serde_json::to_string(body).map_err(|e| format!("{e}"))?;
    Ok(JsValue::from_str(&json))
}

pub async fn get_json<T: DeserializeOwned>(path: &str) -> Result<T, String> {
    let request = build_request("GET", path, None)?;
    let text = checked_text(execute(request).await?).await?;
    serde_json::from_str(&text).map_err(|e| format!("{e}"))
}

/// POST/PUT with a JSON body, JSON answer.
pub async fn send_json<B: Serialize, T: DeserializeOwned>(
    method: &str,
    path: &str,
    body: &B,
) -> Result<T, String> {
    let body = json_body(body)?;
    let request = build_request(method, path, Some(&body))?;
    request
        .headers()
        .set("Content-Type", "application/json")
        .map_err(|e| format!("{e:?}"))?;
    let text = checked_text(execute(request).await?).await?;
    if text.trim().is_empty() {
        return serde_json::from_str("null").map_err(|e| format!("{e}"));
    }
    serde_json::from_str(&text).map_err(|e| format!("{e}"))
}

pub async fn post_json<B: Serialize, T: DeserializeOwned>(path: &str, body: &B) -> Result<T, String> {
    send_json("POST", path, body).await
}

/// Call whose answer body is not needed.
pub async fn send_empty(method: &str, path: &str) -> Result<(), String> {
    let request = build_request(method, path, None)?;
    checked_text(execute(request).await?).await.map(|_| ())
}

/// Multipart upload under the `file` field.
pub async fn upload_file(path: &str, file: &web_sys::File) -> Result<UploadResponse, String> {
    let form_data = FormData::new().map_err(|e| format!("{e:?}"))?;
    form_data
        .append_with_blob("file", file)
        .map_err(|e| format!("{e:?}"))?;
    let request = build_request("POST", path, Some(&form_data.into()))?;
    let text = checked_text(execute(request).await?).await?;
    serde_json::from_str(&text).map_err(|e| format!("{e}"))
}

/// POSTs `body` and feeds every decoded `data:` event to `on_event` as it
/// arrives. A read that stays idle for `idle_timeout_secs` cancels the
/// stream and fails with a stream error.
pub async fn stream_events<B, E, F>(
    path: &str,
    body: &B,
    idle_timeout_secs: u32,
    mut on_event: F,
) -> UseCaseResult<()>
where
    B: Serialize,
    E: DeserializeOwned,
    F: FnMut(E),
{
    let body = json_body(body).map_err(UseCaseError::internal)?;
    let request = build_request("POST", path, Some(&body)).map_err(UseCaseError::transport)?;
    request
        .headers()
        .set("Content-Type", "application/json")
        .map_err(|e| UseCaseError::transport(format!("{e:?}")))?;
    let resp = execute(request).await.map_err(UseCaseError::transport)?;
    if !resp.ok() {
        let text = read_text(&resp).await.unwrap_or_default();
        return Err(UseCaseError::from_http(resp.status(), &text));
    }
    let stream = resp
        .body()
        .ok_or_else(|| UseCaseError::stream("Resposta sem corpo"))?;
    let reader: ReadableStreamDefaultReader = stream.get_reader().unchecked_into();

    let mut decoder = SseDecoder::<E>::new();
    let timeout_ms = idle_timeout_ms(idle_timeout_secs);
    loop {
        let chunk = read_with_timeout(&reader, timeout_ms).await?;
        let done = js_sys::Reflect::get(&chunk, &JsValue::from_str("done"))
            .map(|v| v.is_truthy())
            .unwrap_or(true);
        if done {
            break;
        }
        let value = js_sys::Reflect::get(&chunk, &JsValue::from_str("value"))
            .map_err(|e| UseCaseError::stream(format!("{e:?}")))?;
        let bytes = js_sys::Uint8Array::new(&value).to_vec();
        for event in decoder.push(&bytes) {
            on_event(event);
        }
    }
    for event in decoder.finish() {
        on_event(event);
    }
    if decoder.skipped() > 0 {
        log::warn!("stream {}: {} malformed lines skipped", path, decoder.skipped());
    }
    Ok(())
}

/// Idle timeout for one read, at least a second and within the timer range.
fn idle_timeout_ms(secs: u32) -> i32 {
    i32::try_from(u64::from(secs.max(1)) * 1000).unwrap_or(i32::MAX)
}

/// Races one read against a timer. The timer is cleared whichever side wins.
async fn read_with_timeout(
    reader: &ReadableStreamDefaultReader,
    timeout_ms: i32,
) -> UseCaseResult<JsValue> {
    let window = web_sys::window().ok_or_else(|| UseCaseError::transport("No window object"))?;
    let mut timer = None;
    let timeout = js_sys::Promise::new(&mut |resolve, _reject| {
        timer = window
            .set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, timeout_ms)
            .ok();
    });
    let race = js_sys::Promise::race(&js_sys::Array::of2(&reader.read(), &timeout));
    let winner = JsFuture::from(race).await;
    if let Some(handle) = timer {
        window.clear_timeout_with_handle(handle);
    }
    let winner = winner.map_err(|e| UseCaseError::transport(format!("{e:?}")))?;
    // the timer resolves with `undefined`, a read always yields an object
    if winner.is_undefined() {
        let _ = reader.cancel();
        return Err(UseCaseError::stream("Tempo de resposta esgotado"));
    }
    Ok(winner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_timeout_ms_bounds() {
        assert_eq!(idle_timeout_ms(120), 120_000);
        assert_eq!(idle_timeout_ms(0), 1_000);
        assert_eq!(idle_timeout_ms(u32::MAX), i32::MAX);
    }
}
