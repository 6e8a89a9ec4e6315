//! offrecord-chat - Terminal-Client
//!
//! ```text
//! offrecord-chat https://offrecord.ca/#geheim --nick anna
//! ```
//!
//! Jede Zeile auf stdin wird verschluesselt gesendet; Befehle siehe `/help`.

use anyhow::Result;
use clap::Parser;
use offrecord_client::befehl::HILFE;
use offrecord_client::{
    zufaelliger_kanalname, zufaelliger_nickname, Befehl, ChatSession, Einladung, SessionEreignis,
    LOBBY,
};
use offrecord_observability::logging_initialisieren;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Wartezeit vor einem erneuten Verbindungsversuch
const WIEDERVERBINDEN_NACH: Duration = Duration::from_secs(2);

#[derive(Debug, Parser)]
#[command(name = "offrecord-chat", version, about = "Ephemerer, Ende-zu-Ende-verschluesselter Gruppenchat")]
struct Cli {
    /// Einladungs-Link `<origin>/#<passphrase>`; ohne `#` geht es in die Lobby
    link: String,

    /// Nickname (Standard: zufaellig)
    #[arg(long)]
    nick: Option<String>,

    /// Log-Filter fuer stderr
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging_initialisieren(&cli.log_level, "text");

    let mut einladung = Einladung::parsen(&cli.link)?;
    if einladung.passphrase().is_none() {
        einladung = einladung.mit_passphrase(LOBBY);
    }
    let nickname = cli.nick.unwrap_or_else(zufaelliger_nickname);

    let mut session = ChatSession::verbinden(einladung, nickname).await?;
    println!("-- {} als {} (/help fuer Befehle)", session.link(), session.nickname());

    let mut zeilen = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            zeile = zeilen.next_line() => {
                let Some(zeile) = zeile? else { break };
                let Some(befehl) = Befehl::parsen(&zeile) else { continue };
                if !befehl_ausfuehren(&mut session, befehl).await? {
                    break;
                }
            }

            ereignis = session.naechstes_ereignis(), if session.ist_verbunden() => {
                match ereignis {
                    Ok(ereignis) => ereignis_anzeigen(&session, ereignis),
                    Err(e) => {
                        eprintln!("-- Verbindung verloren: {e}");
                    }
                }
            }

            _ = tokio::time::sleep(WIEDERVERBINDEN_NACH), if !session.ist_verbunden() => {
                match session.wiederverbinden().await {
                    Ok(()) => println!("-- wieder verbunden"),
                    Err(e) => tracing::warn!(fehler = %e, "Wiederverbinden fehlgeschlagen"),
                }
            }
        }
    }

    session.trennen().await;
    Ok(())
}

/// Fuehrt einen Befehl aus; `false` beendet den Client
async fn befehl_ausfuehren(session: &mut ChatSession, befehl: Befehl) -> Result<bool> {
    let ergebnis = match befehl {
        Befehl::Senden(text) => session.senden(&text).await,
        Befehl::Leeren => session.leeren().await,
        Befehl::Beitreten(passphrase) => kanal_wechseln(session, &passphrase).await,
        Befehl::Lobby => kanal_wechseln(session, LOBBY).await,
        Befehl::Zufall => kanal_wechseln(session, &zufaelliger_kanalname()).await,
        Befehl::Link => {
            println!("-- {}", session.link());
            Ok(())
        }
        Befehl::Nick(name) => {
            session.nickname_setzen(name);
            println!("-- Nickname: {}", session.nickname());
            Ok(())
        }
        Befehl::Hilfe => {
            println!("{HILFE}");
            Ok(())
        }
        Befehl::Unbekannt(zeile) => {
            println!("-- Unbekannter Befehl: {zeile}");
            Ok(())
        }
        Befehl::Beenden => return Ok(false),
    };

    if let Err(e) = ergebnis {
        eprintln!("-- Fehler: {e}");
    }
    Ok(true)
}

async fn kanal_wechseln(
    session: &mut ChatSession,
    passphrase: &str,
) -> offrecord_client::ClientResult<()> {
    if session.passphrase_setzen(passphrase).await? {
        println!("-- {}", session.link());
    }
    Ok(())
}

fn ereignis_anzeigen(session: &ChatSession, ereignis: SessionEreignis) {
    match ereignis {
        SessionEreignis::Neu(anzahl) => {
            let nachrichten = session.nachrichten();
            let start = nachrichten.len().saturating_sub(anzahl);
            for nachricht in &nachrichten[start..] {
                println!("{nachricht}");
            }
        }
        SessionEreignis::Geleert => println!("-- Kanal geleert"),
        SessionEreignis::Anwesenheit(anzahl) => println!("-- {anzahl} verbunden"),
        SessionEreignis::Getrennt => eprintln!("-- Verbindung getrennt"),
    }
}
