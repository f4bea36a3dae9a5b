//! Classroom ids and invite links.

use rand::Rng;
use serde::Serialize;

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_LEN: usize = 13;
const INVITE_SUBJECT: &str = "Join my Virtual Classroom";

/// A fresh 13-character base-36 classroom id.
pub fn generate_classroom_id() -> String {
    let mut rng = rand::thread_rng();
    (0..ID_LEN)
        .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
        .collect()
}

pub fn invite_link(base_url: &str, classroom_id: &str) -> String {
    format!("{}/classroom/{}", base_url.trim_end_matches('/'), classroom_id)
}

/// The classroom id a pasted invite link points at: its last path segment.
pub fn classroom_id_from_link(link: &str) -> &str {
    link.trim()
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default()
}

/// Invite link plus ready-made share targets.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Invitation {
    pub classroom_id: String,
    pub link: String,
    pub email_href: String,
    pub whatsapp_href: String,
}

impl Invitation {
    pub fn new(base_url: &str, classroom_id: &str) -> Self {
        let link = invite_link(base_url, classroom_id);
        let body = format!("Join my virtual classroom using this link: {}", link);

        Self {
            classroom_id: classroom_id.to_string(),
            email_href: format!(
                "mailto:?subject={}&body={}",
                urlencoding::encode(INVITE_SUBJECT),
                urlencoding::encode(&body)
            ),
            whatsapp_href: format!("https://wa.me/?text={}", urlencoding::encode(&body)),
            link,
        }
    }
}
