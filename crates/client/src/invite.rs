//! Einladungs-Links
//!
//! Ein Kanal wird als `<origin>/#<passphrase>` geteilt. Das Fragment
//! verlaesst den Client nie; zum Relay geht nur die daraus abgeleitete
//! Kanal-ID.
//!
//! ```text
//! https://offrecord.ca/#lobby  ->  wss://offrecord.ca/ws/<channel_id>
//! http://localhost:8084/#abc   ->  ws://localhost:8084/ws/<channel_id>
//! ```

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use offrecord_core::ChannelId;
use rand::{Rng, RngCore};

use crate::error::{ClientError, ClientResult};

/// Passphrase des oeffentlichen Kanals
pub const LOBBY: &str = "lobby";

const NICKNAME_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const NICKNAME_LAENGE: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Schema {
    Http,
    Https,
}

/// Geparster Einladungs-Link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Einladung {
    schema: Schema,
    host: String,
    passphrase: Option<String>,
}

impl Einladung {
    /// Parst `http(s)://host[:port][/pfad]#passphrase`
    ///
    /// Ohne `#` ist kein Kanal gewaehlt; `#` mit leerem Rest ist der Kanal
    /// der leeren Passphrase.
    pub fn parsen(link: &str) -> ClientResult<Self> {
        let link = link.trim();
        let (adresse, passphrase) = match link.split_once('#') {
            Some((adresse, fragment)) => (adresse, Some(fragment.to_string())),
            None => (link, None),
        };

        let (schema, rest) = if let Some(rest) = adresse.strip_prefix("https://") {
            (Schema::Https, rest)
        } else if let Some(rest) = adresse.strip_prefix("http://") {
            (Schema::Http, rest)
        } else {
            return Err(ClientError::UngueltigeEinladung(
                "Link muss mit http:// oder https:// beginnen".to_string(),
            ));
        };

        let host = rest
            .split(|c: char| c == '/' || c == '?')
            .next()
            .unwrap_or_default()
            .to_string();
        if host.is_empty() {
            return Err(ClientError::UngueltigeEinladung("Host fehlt".to_string()));
        }

        Ok(Self {
            schema,
            host,
            passphrase,
        })
    }

    /// Gleicher Server, andere Passphrase
    pub fn mit_passphrase(&self, passphrase: impl Into<String>) -> Self {
        Self {
            passphrase: Some(passphrase.into()),
            ..self.clone()
        }
    }

    pub fn passphrase(&self) -> Option<&str> {
        self.passphrase.as_deref()
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Teilbarer Link
    pub fn link(&self) -> String {
        let origin = self.origin();
        match &self.passphrase {
            Some(passphrase) => format!("{origin}/#{passphrase}"),
            None => format!("{origin}/"),
        }
    }

    /// WebSocket-Adresse des Kanals auf demselben Host
    pub fn websocket_url(&self, channel_id: &ChannelId) -> String {
        let schema = match self.schema {
            Schema::Http => "ws",
            Schema::Https => "wss",
        };
        format!("{schema}://{}/ws/{channel_id}", self.host)
    }

    fn origin(&self) -> String {
        let schema = match self.schema {
            Schema::Http => "http",
            Schema::Https => "https",
        };
        format!("{schema}://{}", self.host)
    }
}

/// Zufaelliger, praktisch unratbarer Kanalname
///
/// 64 Zufallsbytes als URL-sicheres Base64 ohne Padding (86 Zeichen).
pub fn zufaelliger_kanalname() -> String {
    let mut bytes = [0u8; 64];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Zufaelliger Nickname aus Kleinbuchstaben und Ziffern
pub fn zufaelliger_nickname() -> String {
    let mut rng = rand::thread_rng();
    (0..NICKNAME_LAENGE)
        .map(|_| NICKNAME_ALPHABET[rng.gen_range(0..NICKNAME_ALPHABET.len())] as char)
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
