//! Checks an audio URL against the file-server contract and reads what the
//! container claims about itself from the first bytes of the stream.

use crate::audio::error::AudioError;
use reqwest::header::{ACCEPT_RANGES, CONTENT_LENGTH, CONTENT_RANGE, RANGE};
use reqwest::{Client, StatusCode};
use std::io::Cursor;
use symphonia::core::codecs::CODEC_TYPE_NULL;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::{MediaSourceStream, MediaSourceStreamOptions};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tokio::task;
use tracing::{debug, info, instrument, warn};

const LOG_TARGET: &str = "sermon_stream::audio::probe";

/// What the container header says about the stream.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecoderInfo {
    pub codec: Option<String>,
    pub sample_rate: Option<u32>,
    pub channels: Option<usize>,
    /// Duration as the container reports it from the bytes seen so far.
    pub reported_duration: Option<f64>,
}

/// Result of a ranged fetch of the first bytes of an audio URL.
#[derive(Debug, Clone, Default)]
pub struct ProbeReport {
    pub url: String,
    pub status: u16,
    pub accept_ranges: Option<String>,
    pub content_range: Option<String>,
    pub content_length: Option<u64>,
    /// Total resource size, from `Content-Range` (or `Content-Length` on a plain 200).
    pub total_bytes: Option<u64>,
    pub bytes_read: usize,
    pub decoder: Option<DecoderInfo>,
    pub decoder_error: Option<String>,
}

impl ProbeReport {
    /// True when the server answered the range request with `206`, a valid
    /// `Content-Range` and `Accept-Ranges: bytes`.
    pub fn supports_ranges(&self) -> bool {
        self.status == StatusCode::PARTIAL_CONTENT.as_u16()
            && self.content_range.as_deref().and_then(parse_content_range).is_some()
            && self.accept_ranges.as_deref().map_or(false, |v| v.eq_ignore_ascii_case("bytes"))
    }

    /// Fails unless seeking by byte ranges will work against this server.
    pub fn verify_range_contract(&self) -> Result<(), AudioError> {
        if self.supports_ranges() {
            Ok(())
        } else {
            Err(AudioError::RangeNotSupported(format!(
                "status {}, Content-Range {:?}, Accept-Ranges {:?}",
                self.status, self.content_range, self.accept_ranges
            )))
        }
    }
}

/// Parses `bytes START-END/TOTAL` (TOTAL may be `*`).
pub fn parse_content_range(value: &str) -> Option<(u64, u64, Option<u64>)> {
    let rest = value.trim().strip_prefix("bytes")?.trim_start();
    let (span, total) = rest.split_once('/')?;
    let (start, end) = span.split_once('-')?;
    let start: u64 = start.trim().parse().ok()?;
    let end: u64 = end.trim().parse().ok()?;
    if end < start {
        return None;
    }
    let total = match total.trim() {
        "*" => None,
        t => Some(t.parse().ok()?),
    };
    Some((start, end, total))
}

fn extension_hint(url: &str) -> Hint {
    let mut hint = Hint::new();
    let path = url.split(['?', '#']).next().unwrap_or(url);
    if let Some((_, ext)) = path.rsplit_once('.') {
        if !ext.contains('/') {
            hint.with_extension(ext);
        }
    }
    hint
}

/// Reads container metadata from an in-memory prefix of the stream.
pub fn decoder_info(bytes: Vec<u8>, url_hint: &str) -> Result<DecoderInfo, AudioError> {
    let mss = MediaSourceStream::new(Box::new(Cursor::new(bytes)), MediaSourceStreamOptions::default());
    let probed = symphonia::default::get_probe().format(
        &extension_hint(url_hint),
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;

    let track = probed
        .format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| AudioError::UnsupportedFormat("No suitable audio track found".to_string()))?;
    let params = &track.codec_params;

    let reported_duration = match (params.n_frames, params.time_base, params.sample_rate) {
        (Some(frames), Some(time_base), _) => {
            let time = time_base.calc_time(frames);
            Some(time.seconds as f64 + time.frac)
        }
        (Some(frames), None, Some(rate)) if rate > 0 => Some(frames as f64 / rate as f64),
        _ => None,
    };

    let codec = symphonia::default::get_codecs()
        .get_codec(params.codec)
        .map(|descriptor| descriptor.short_name.to_string());

    Ok(DecoderInfo {
        codec,
        sample_rate: params.sample_rate,
        channels: params.channels.map(|c| c.count()),
        reported_duration,
    })
}

/// Fetches the first `probe_bytes` of `url` with a range request and inspects them.
#[instrument(skip(client), fields(url = %url))]
pub async fn probe_stream(client: &Client, url: &str, probe_bytes: usize) -> Result<ProbeReport, AudioError> {
    let last = probe_bytes.saturating_sub(1);
    debug!(target: LOG_TARGET, "Requesting bytes=0-{}", last);
    let response = client
        .get(url)
        .header(RANGE, format!("bytes=0-{}", last))
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(AudioError::HttpStatus(status.as_u16()));
    }

    let header = |name: reqwest::header::HeaderName| {
        response
            .headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    let accept_ranges = header(ACCEPT_RANGES);
    let content_range = header(CONTENT_RANGE);
    let content_length = header(CONTENT_LENGTH).and_then(|v| v.parse().ok());
    let total_bytes = content_range
        .as_deref()
        .and_then(parse_content_range)
        .and_then(|(_, _, total)| total)
        .or(if status == StatusCode::OK { content_length } else { None });

    let mut body = response.bytes().await?.to_vec();
    if status == StatusCode::OK {
        warn!(target: LOG_TARGET, "Server ignored the range request and sent the full body");
        body.truncate(probe_bytes);
    }
    let bytes_read = body.len();

    let hint = url.to_string();
    let (decoder, decoder_error) = match task::spawn_blocking(move || decoder_info(body, &hint)).await? {
        Ok(info) => (Some(info), None),
        Err(e) => {
            warn!(target: LOG_TARGET, "Could not read container header: {}", e);
            (None, Some(e.to_string()))
        }
    };

    info!(target: LOG_TARGET, status = status.as_u16(), bytes_read, ?total_bytes, "Probe complete");
    Ok(ProbeReport {
        url: url.to_string(),
        status: status.as_u16(),
        accept_ranges,
        content_range,
        content_length,
        total_bytes,
        bytes_read,
        decoder,
        decoder_error,
    })
}
