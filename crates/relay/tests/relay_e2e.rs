//! End-to-End-Tests: echter Relay auf 127.0.0.1:0, Clients via tokio-tungstenite

use futures_util::{SinkExt, StreamExt};
use offrecord_core::ChannelId;
use offrecord_crypto::{nachricht_entschluesseln, nachricht_verschluesseln, KanalSchluessel, Klartext};
use offrecord_observability::RelayMetriken;
use offrecord_protocol::{Eintrag, ServerNachricht};
use offrecord_relay::{RelayConfig, RelayServer, RelayState};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

const TIMEOUT: Duration = Duration::from_secs(5);

// ---------------------------------------------------------------------------
// Hilfsfunktionen
// ---------------------------------------------------------------------------

struct TestRelay {
    addr: SocketAddr,
    state: Arc<RelayState>,
    shutdown_tx: watch::Sender<bool>,
}

async fn relay_starten() -> TestRelay {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let state = RelayState::neu(
        RelayConfig::default(),
        RelayMetriken::neu().unwrap(),
        shutdown_rx,
    );
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(RelayServer::neu(Arc::clone(&state), addr).mit_listener(listener));
    TestRelay {
        addr,
        state,
        shutdown_tx,
    }
}

async fn verbinden(addr: SocketAddr, kanal: &str) -> Client {
    let (ws, _) = connect_async(format!("ws://{addr}/ws/{kanal}")).await.unwrap();
    ws
}

/// Naechste Server-Nachricht, Ping/Pong wird uebersprungen
async fn naechste(client: &mut Client) -> ServerNachricht {
    loop {
        let nachricht = tokio::time::timeout(TIMEOUT, client.next())
            .await
            .expect("Timeout beim Warten auf Nachricht")
            .expect("Verbindung unerwartet beendet")
            .expect("WebSocket-Fehler");
        match nachricht {
            Message::Text(text) => return ServerNachricht::aus_json(text.as_str()).unwrap(),
            Message::Ping(_) | Message::Pong(_) => continue,
            andere => panic!("Text-Frame erwartet, {andere:?} erhalten"),
        }
    }
}

/// Liest bis zum Close-Frame und gibt Code und Grund zurueck
async fn close_erwarten(client: &mut Client) -> (u16, String) {
    loop {
        let nachricht = tokio::time::timeout(TIMEOUT, client.next())
            .await
            .expect("Timeout beim Warten auf Close")
            .expect("Verbindung ohne Close-Frame beendet")
            .expect("WebSocket-Fehler");
        if let Message::Close(Some(frame)) = nachricht {
            return (u16::from(frame.code), frame.reason.as_str().to_string());
        }
    }
}

async fn posten(client: &mut Client, payload: Value) {
    client
        .send(Message::text(payload.to_string()))
        .await
        .unwrap();
}

fn verlauf_payloads(nachricht: ServerNachricht) -> Vec<Value> {
    match nachricht {
        ServerNachricht::Verlauf(eintraege) => {
            eintraege.iter().map(|e| e.payload().clone()).collect()
        }
        andere => panic!("Verlauf erwartet, {andere:?} erhalten"),
    }
}

fn einzelner_eintrag(nachricht: ServerNachricht) -> Eintrag {
    match nachricht {
        ServerNachricht::Verlauf(mut eintraege) if eintraege.len() == 1 => eintraege.remove(0),
        andere => panic!("Einzelnen Eintrag erwartet, {andere:?} erhalten"),
    }
}

async fn warten_bis(mut bedingung: impl FnMut() -> bool) {
    let start = tokio::time::Instant::now();
    while !bedingung() {
        assert!(start.elapsed() < TIMEOUT, "Bedingung nicht erreicht");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn neuer_listener_sieht_die_letzten_zehn() {
    let relay = relay_starten().await;

    let mut a = verbinden(relay.addr, "zehn").await;
    assert_eq!(verlauf_payloads(naechste(&mut a).await), Vec::<Value>::new());
    assert_eq!(naechste(&mut a).await, ServerNachricht::anwesenheit(1));

    for i in 1..=12 {
        posten(&mut a, json!(format!("m{i}"))).await;
    }
    for i in 1..=12 {
        let eintrag = einzelner_eintrag(naechste(&mut a).await);
        assert_eq!(eintrag.payload(), &json!(format!("m{i}")));
    }

    let mut b = verbinden(relay.addr, "zehn").await;
    let erwartet: Vec<Value> = (3..=12).map(|i| json!(format!("m{i}"))).collect();
    assert_eq!(verlauf_payloads(naechste(&mut b).await), erwartet);
    assert_eq!(naechste(&mut b).await, ServerNachricht::anwesenheit(2));
    assert_eq!(naechste(&mut a).await, ServerNachricht::anwesenheit(2));
}

#[tokio::test]
async fn zu_grosses_frame_schliesst_nur_diese_verbindung() {
    let relay = relay_starten().await;
    let kanal = ChannelId::from("gross");

    let mut a = verbinden(relay.addr, kanal.as_str()).await;
    naechste(&mut a).await;
    naechste(&mut a).await;
    posten(&mut a, json!("m1")).await;
    einzelner_eintrag(naechste(&mut a).await);

    let mut b = verbinden(relay.addr, kanal.as_str()).await;
    assert_eq!(verlauf_payloads(naechste(&mut b).await), vec![json!("m1")]);
    naechste(&mut b).await;
    assert_eq!(naechste(&mut a).await, ServerNachricht::anwesenheit(2));

    b.send(Message::binary(vec![0u8; 2 * 1024 * 1024]))
        .await
        .unwrap();
    let (code, grund) = close_erwarten(&mut b).await;
    assert_eq!(code, 1009);
    assert_eq!(grund, "Message too long");

    // A bleibt verbunden und erfaehrt nur die neue Anzahl
    assert_eq!(naechste(&mut a).await, ServerNachricht::anwesenheit(1));

    let verlauf = relay.state.registry.kanal(&kanal).unwrap().verlauf();
    assert_eq!(verlauf.len(), 1);
    assert_eq!(verlauf[0].payload(), &json!("m1"));
    assert_eq!(
        relay
            .state
            .metriken
            .abgewiesene_frames_total
            .with_label_values(&["zu_gross"])
            .get(),
        1
    );
}

#[tokio::test]
async fn frame_ueber_transport_limit_schliesst_mit_1009() {
    let relay = relay_starten().await;
    let kanal = ChannelId::from("riesig");
    let limit = relay.state.config.transport_limit();

    let mut a = verbinden(relay.addr, kanal.as_str()).await;
    naechste(&mut a).await;
    naechste(&mut a).await;

    let b = verbinden(relay.addr, kanal.as_str()).await;
    let (mut senke, mut strom) = b.split();
    assert_eq!(naechste(&mut a).await, ServerNachricht::anwesenheit(2));

    // Senden parallel, der Relay liest die Nutzdaten nicht mehr
    let senden = tokio::spawn(async move {
        let _ = senke.send(Message::binary(vec![0u8; limit + 1024 * 1024])).await;
    });

    let (code, grund) = loop {
        let nachricht = tokio::time::timeout(TIMEOUT, strom.next())
            .await
            .expect("Timeout beim Warten auf Close")
            .expect("Verbindung ohne Close-Frame beendet")
            .expect("WebSocket-Fehler");
        if let Message::Close(Some(frame)) = nachricht {
            break (u16::from(frame.code), frame.reason.as_str().to_string());
        }
    };
    assert_eq!(code, 1009);
    assert_eq!(grund, "Message too long");
    senden.abort();

    assert_eq!(naechste(&mut a).await, ServerNachricht::anwesenheit(1));
    assert!(relay.state.registry.kanal(&kanal).unwrap().verlauf().is_empty());
    assert_eq!(
        relay
            .state
            .metriken
            .abgewiesene_frames_total
            .with_label_values(&["zu_gross"])
            .get(),
        1
    );
}

#[tokio::test]
async fn kein_json_schliesst_mit_1007() {
    let relay = relay_starten().await;
    let mut a = verbinden(relay.addr, "kaputt").await;
    naechste(&mut a).await;
    naechste(&mut a).await;

    a.send(Message::text("{kein json")).await.unwrap();
    let (code, grund) = close_erwarten(&mut a).await;
    assert_eq!(code, 1007);
    assert!(grund.starts_with("Failure: "), "{grund}");
    assert!(grund.len() <= 123);
}

#[tokio::test]
async fn leeren_meldet_cl_und_leert_verlauf() {
    let relay = relay_starten().await;
    let mut a = verbinden(relay.addr, "wisch").await;
    naechste(&mut a).await;
    naechste(&mut a).await;

    posten(&mut a, json!("weg damit")).await;
    einzelner_eintrag(naechste(&mut a).await);
    posten(&mut a, json!({"clear": true})).await;
    assert_eq!(naechste(&mut a).await, ServerNachricht::geleert());

    let mut b = verbinden(relay.addr, "wisch").await;
    assert_eq!(verlauf_payloads(naechste(&mut b).await), Vec::<Value>::new());
}

#[tokio::test]
async fn passphrasen_kanaele_sind_getrennt() {
    let relay = relay_starten().await;
    let p1 = KanalSchluessel::aus_passphrase("p1");
    let p2 = KanalSchluessel::aus_passphrase("p2");
    assert_ne!(p1.channel_id(), p2.channel_id());

    let mut a = verbinden(relay.addr, p1.channel_id().as_str()).await;
    let mut b = verbinden(relay.addr, p2.channel_id().as_str()).await;
    for client in [&mut a, &mut b] {
        naechste(client).await;
        naechste(client).await;
    }

    let umschlag = nachricht_verschluesseln(&p1, &Klartext::neu("anna", "nur fuer p1")).unwrap();
    a.send(Message::binary(umschlag.kodieren().unwrap()))
        .await
        .unwrap();

    let eintrag = einzelner_eintrag(naechste(&mut a).await);
    let payload = eintrag.payload().as_str().unwrap();
    assert_eq!(
        nachricht_entschluesseln(&p1, payload).unwrap(),
        Klartext::neu("anna", "nur fuer p1")
    );
    assert!(nachricht_entschluesseln(&p2, payload)
        .unwrap_err()
        .ist_authentifizierung());

    // B darf nichts davon sehen
    let still = tokio::time::timeout(Duration::from_millis(300), b.next()).await;
    assert!(still.is_err(), "Kanal p2 hat eine Nachricht aus p1 erhalten");
    assert!(relay
        .state
        .registry
        .kanal(p2.channel_id())
        .unwrap()
        .verlauf()
        .is_empty());
}

#[tokio::test]
async fn letzter_listener_gibt_kanal_frei() {
    let relay = relay_starten().await;
    let kanal = ChannelId::from("fluechtig");

    let mut a = verbinden(relay.addr, kanal.as_str()).await;
    naechste(&mut a).await;
    naechste(&mut a).await;
    posten(&mut a, json!("vergessen")).await;
    einzelner_eintrag(naechste(&mut a).await);
    assert_eq!(relay.state.registry.kanal_anzahl(), 1);

    a.close(None).await.unwrap();
    let state = Arc::clone(&relay.state);
    warten_bis(move || state.registry.kanal_anzahl() == 0).await;
    let state = Arc::clone(&relay.state);
    warten_bis(move || state.metriken.verbundene_listener.get() == 0).await;

    let mut b = verbinden(relay.addr, kanal.as_str()).await;
    assert_eq!(verlauf_payloads(naechste(&mut b).await), Vec::<Value>::new());
}

#[tokio::test]
async fn kanal_id_mit_schraegstrich() {
    let relay = relay_starten().await;
    let mut a = verbinden(relay.addr, "ab/cd+ef").await;
    naechste(&mut a).await;
    assert!(relay
        .state
        .registry
        .kanal(&ChannelId::from("ab/cd+ef"))
        .is_some());
}

#[tokio::test]
async fn shutdown_schliesst_mit_1001() {
    let relay = relay_starten().await;
    let mut a = verbinden(relay.addr, "ende").await;
    naechste(&mut a).await;
    naechste(&mut a).await;

    relay.shutdown_tx.send(true).unwrap();
    let (code, _) = close_erwarten(&mut a).await;
    assert_eq!(code, 1001);
}

#[tokio::test]
async fn health_endpunkt_liefert_json() {
    let relay = relay_starten().await;
    let mut a = verbinden(relay.addr, "gesund").await;
    naechste(&mut a).await;

    let mut stream = TcpStream::connect(relay.addr).await.unwrap();
    stream
        .write_all(b"GET /health HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        .await
        .unwrap();
    let mut antwort = String::new();
    stream.read_to_string(&mut antwort).await.unwrap();

    assert!(antwort.starts_with("HTTP/1.1 200"), "{antwort}");
    assert!(antwort.contains("\"status\":\"healthy\""));
    assert!(antwort.contains("\"aktive_kanaele\":1"));
    assert!(antwort.contains("\"verbindungen\":1"));
}
