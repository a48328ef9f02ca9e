use std::collections::HashMap;

use url::form_urlencoded;

use crate::errors::ResizeError;
use crate::event::RequestRecord;
use crate::processor::ResizeParams;

const AWS_DOMAIN: &str = ".amazonaws.com";
const S3_LABEL: &str = ".s3.";

/// Everything the origin-response pipeline needs to know about a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRequest {
    pub bucket: String,
    pub path: String,
    pub params: ResizeParams,
}

/// Extracts the bucket, object path and resize parameters from a request.
///
/// Numeric ranges are not checked here, that happens right before resizing.
pub fn parse(request: &RequestRecord) -> Result<ParsedRequest, ResizeError> {
    let path = parse_path(&request.uri)?;
    let bucket = parse_bucket(request)?;

    let query = parse_query(&request.querystring);
    let params = ResizeParams {
        width: parse_int(&query, "w")?,
        height: parse_int(&query, "h")?,
        quality: parse_int(&query, "q")?,
    };

    Ok(ParsedRequest {
        bucket,
        path,
        params,
    })
}

fn parse_path(uri: &str) -> Result<String, ResizeError> {
    check_escapes(uri)?;

    let decoded = urlencoding::decode(uri)
        .map_err(|e| ResizeError::invalid(format!("path is not valid utf-8 once decoded: {}", e)))?;

    let path = decoded.strip_prefix('/').unwrap_or(decoded.as_ref());
    Ok(path.to_string())
}

/// Every `%` has to start a two digit hex escape.
fn check_escapes(uri: &str) -> Result<(), ResizeError> {
    let bytes = uri.as_bytes();
    for (i, _) in uri.match_indices('%') {
        let escape = bytes.get(i + 1..i + 3);
        if !matches!(escape, Some(pair) if pair.iter().all(u8::is_ascii_hexdigit)) {
            return Err(ResizeError::invalid(format!(
                "malformed percent-encoding at byte {} of {:?}",
                i, uri
            )));
        }
    }

    Ok(())
}

fn parse_bucket(request: &RequestRecord) -> Result<String, ResizeError> {
    let domain = request
        .origin_domain()
        .ok_or_else(|| ResizeError::invalid("request has no s3 origin"))?;

    Ok(bucket_from_domain(domain).to_string())
}

/// Strips the trailing `.s3.<region>.amazonaws.com` from an origin host.
///
/// Only the final, real suffix goes: `hp.s3.hp.s3.ap-northeast-2.amazonaws.com`
/// belongs to the bucket `hp.s3.hp`. Hosts that don't end in an S3 suffix
/// are taken to be the bucket name as-is.
pub fn bucket_from_domain(domain: &str) -> &str {
    let rest = match domain.strip_suffix(AWS_DOMAIN) {
        Some(rest) => rest,
        None => return domain,
    };

    // Legacy global endpoint, `<bucket>.s3.amazonaws.com`.
    if let Some(bucket) = rest.strip_suffix(".s3") {
        return bucket;
    }

    match rest.rsplit_once(S3_LABEL) {
        Some((bucket, region)) if is_region(region) && !bucket.is_empty() => bucket,
        _ => domain,
    }
}

fn is_region(region: &str) -> bool {
    !region.is_empty()
        && region
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

/// Single valued query parameters, the first non-empty value wins.
fn parse_query(querystring: &str) -> HashMap<String, String> {
    let mut params = HashMap::new();
    for (key, value) in form_urlencoded::parse(querystring.as_bytes()) {
        if value.is_empty() {
            continue;
        }

        params
            .entry(key.into_owned())
            .or_insert_with(|| value.into_owned());
    }

    params
}

fn parse_int(query: &HashMap<String, String>, key: &str) -> Result<Option<i64>, ResizeError> {
    query
        .get(key)
        .map(|raw| {
            raw.trim()
                .parse::<i64>()
                .map_err(|_| ResizeError::invalid(format!("`{}` must be an integer, got {:?}", key, raw)))
        })
        .transpose()
}
