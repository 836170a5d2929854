//! Integration-Tests fuer Voice-Praesenz, Sprechvergabe und Relay
//!
//! Die Tests fahren den EventDispatcher direkt gegen einen frischen
//! SignalingZustand und pruefen die Ereignisfolge pro Empfaenger.

use funkraum_core::types::{ConnectionId, RoomId};
use funkraum_protocol::events::{ClientEvent, ErrorKind, ServerEvent};
use funkraum_signaling::{EventDispatcher, SignalingConfig, SignalingZustand};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Frischer Server-Zustand mit Dispatcher
fn aufbau() -> (Arc<SignalingZustand>, EventDispatcher) {
    let zustand = SignalingZustand::neu(SignalingConfig::default());
    let dispatcher = EventDispatcher::neu(Arc::clone(&zustand));
    (zustand, dispatcher)
}

/// Nimmt eine Verbindung an und registriert sie unter einem Namen
fn verbinden(
    zustand: &SignalingZustand,
    dispatcher: &EventDispatcher,
    name: &str,
) -> (ConnectionId, mpsc::Receiver<ServerEvent>) {
    let id = ConnectionId::new();
    let rx = zustand.broadcaster.verbindung_registrieren(id);
    dispatcher.dispatch(
        id,
        ClientEvent::Register {
            name: name.to_string(),
        },
    );
    (id, rx)
}

/// Liest alle bereits eingereihten Ereignisse einer Queue
fn abfluss(rx: &mut mpsc::Receiver<ServerEvent>) -> Vec<ServerEvent> {
    let mut ereignisse = Vec::new();
    while let Ok(ereignis) = rx.try_recv() {
        ereignisse.push(ereignis);
    }
    ereignisse
}

fn raum(id: &str) -> RoomId {
    RoomId::new(id)
}

fn beitreten(dispatcher: &EventDispatcher, id: ConnectionId, raum_id: &str) {
    dispatcher.dispatch(
        id,
        ClientEvent::JoinVoice {
            room_id: raum(raum_id),
        },
    );
}

#[tokio::test]
async fn voice_beitritt_verteilt_personalisierte_listen() {
    let (zustand, dispatcher) = aufbau();
    let (a, mut rx_a) = verbinden(&zustand, &dispatcher, "Alpha");
    let (b, mut rx_b) = verbinden(&zustand, &dispatcher, "Bravo");
    abfluss(&mut rx_a);
    abfluss(&mut rx_b);

    // Erster Teilnehmer sieht einen leeren Raum
    beitreten(&dispatcher, a, "funk");
    let ereignisse = abfluss(&mut rx_a);
    assert_eq!(ereignisse.len(), 1);
    match &ereignisse[0] {
        ServerEvent::VoiceParticipants {
            room_id,
            participants,
        } => {
            assert_eq!(room_id.as_str(), "funk");
            assert!(participants.is_empty());
        }
        sonst => panic!("voice_participants erwartet, war {:?}", sonst),
    }

    // Zweiter Beitritt: Bestehende erfahren es zuerst, dann die Listen
    beitreten(&dispatcher, b, "funk");

    let bei_a = abfluss(&mut rx_a);
    assert_eq!(bei_a.len(), 2);
    assert!(matches!(
        &bei_a[0],
        ServerEvent::VoiceUserJoined {
            connection_id,
            name,
            ..
        } if *connection_id == b && name == "Bravo"
    ));
    match &bei_a[1] {
        ServerEvent::VoiceParticipants { participants, .. } => {
            assert_eq!(participants.len(), 1);
            assert_eq!(participants[0].connection_id, b);
            assert!(!participants[0].talking);
        }
        sonst => panic!("voice_participants erwartet, war {:?}", sonst),
    }

    // Der Beitretende bekommt nur seine Liste, ohne sich selbst
    let bei_b = abfluss(&mut rx_b);
    assert_eq!(bei_b.len(), 1);
    match &bei_b[0] {
        ServerEvent::VoiceParticipants { participants, .. } => {
            assert_eq!(participants.len(), 1);
            assert_eq!(participants[0].connection_id, a);
            assert_eq!(participants[0].name, "Alpha");
        }
        sonst => panic!("voice_participants erwartet, war {:?}", sonst),
    }
}

#[tokio::test]
async fn doppelter_voice_beitritt_ist_noop() {
    let (zustand, dispatcher) = aufbau();
    let (a, mut rx_a) = verbinden(&zustand, &dispatcher, "Alpha");
    abfluss(&mut rx_a);

    beitreten(&dispatcher, a, "funk");
    abfluss(&mut rx_a);

    beitreten(&dispatcher, a, "funk");
    assert!(abfluss(&mut rx_a).is_empty());
    assert_eq!(zustand.voice.teilnehmer(&raum("funk")).len(), 1);
}

#[tokio::test]
async fn leave_voice_ohne_beitritt_ist_noop() {
    let (zustand, dispatcher) = aufbau();
    let (a, mut rx_a) = verbinden(&zustand, &dispatcher, "Alpha");
    let (b, mut rx_b) = verbinden(&zustand, &dispatcher, "Bravo");
    beitreten(&dispatcher, b, "funk");
    abfluss(&mut rx_a);
    abfluss(&mut rx_b);

    dispatcher.dispatch(
        a,
        ClientEvent::LeaveVoice {
            room_id: raum("funk"),
        },
    );

    // Keine Zustandsaenderung, kein Ereignis
    assert!(abfluss(&mut rx_a).is_empty());
    assert!(abfluss(&mut rx_b).is_empty());
    assert!(zustand.voice.ist_teilnehmer(&b, &raum("funk")));
}

#[tokio::test]
async fn austritt_verteilt_listen_und_left() {
    let (zustand, dispatcher) = aufbau();
    let (a, mut rx_a) = verbinden(&zustand, &dispatcher, "Alpha");
    let (b, mut rx_b) = verbinden(&zustand, &dispatcher, "Bravo");
    beitreten(&dispatcher, a, "funk");
    beitreten(&dispatcher, b, "funk");
    abfluss(&mut rx_a);
    abfluss(&mut rx_b);

    dispatcher.dispatch(
        b,
        ClientEvent::LeaveVoice {
            room_id: raum("funk"),
        },
    );

    let bei_a = abfluss(&mut rx_a);
    assert_eq!(bei_a.len(), 2);
    assert!(matches!(
        &bei_a[0],
        ServerEvent::VoiceParticipants { participants, .. } if participants.is_empty()
    ));
    assert!(matches!(
        &bei_a[1],
        ServerEvent::VoiceUserLeft {
            connection_id,
            name,
            ..
        } if *connection_id == b && name == "Bravo"
    ));

    // Der Austretende selbst bekommt nichts
    assert!(abfluss(&mut rx_b).is_empty());
    assert!(!zustand.voice.ist_teilnehmer(&b, &raum("funk")));
}

#[tokio::test]
async fn sprechvergabe_erster_gewinnt() {
    let (zustand, dispatcher) = aufbau();
    let (a, mut rx_a) = verbinden(&zustand, &dispatcher, "Alpha");
    let (b, mut rx_b) = verbinden(&zustand, &dispatcher, "Bravo");
    beitreten(&dispatcher, a, "funk");
    beitreten(&dispatcher, b, "funk");
    abfluss(&mut rx_a);
    abfluss(&mut rx_b);

    // A beginnt zu sprechen: Update an beide, auch an A selbst
    dispatcher.dispatch(
        a,
        ClientEvent::VoiceTalking {
            room_id: raum("funk"),
            talking: true,
        },
    );
    assert!(matches!(
        abfluss(&mut rx_a).as_slice(),
        [ServerEvent::VoiceTalkingUpdate {
            connection_id,
            talking: true,
            ..
        }] if *connection_id == a
    ));
    assert!(matches!(
        abfluss(&mut rx_b).as_slice(),
        [ServerEvent::VoiceTalkingUpdate { talking: true, .. }]
    ));

    // B versucht es im besetzten Raum: BUSY nur an B, kein Broadcast
    dispatcher.dispatch(
        b,
        ClientEvent::VoiceTalking {
            room_id: raum("funk"),
            talking: true,
        },
    );
    assert!(matches!(
        abfluss(&mut rx_b).as_slice(),
        [ServerEvent::Error {
            kind: ErrorKind::Busy,
            ..
        }]
    ));
    assert!(abfluss(&mut rx_a).is_empty());

    // Stop ohne Sprechrecht ist ein No-op
    dispatcher.dispatch(
        b,
        ClientEvent::VoiceTalking {
            room_id: raum("funk"),
            talking: false,
        },
    );
    assert!(abfluss(&mut rx_a).is_empty());
    assert!(abfluss(&mut rx_b).is_empty());

    // Wiederholter Start des Sprechers: kein Uebergang, kein Ereignis
    dispatcher.dispatch(
        a,
        ClientEvent::VoiceTalking {
            room_id: raum("funk"),
            talking: true,
        },
    );
    assert!(abfluss(&mut rx_a).is_empty());
    assert!(abfluss(&mut rx_b).is_empty());

    // Nach dem Stop darf B uebernehmen
    dispatcher.dispatch(
        a,
        ClientEvent::VoiceTalking {
            room_id: raum("funk"),
            talking: false,
        },
    );
    assert!(matches!(
        abfluss(&mut rx_b).as_slice(),
        [ServerEvent::VoiceTalkingUpdate { talking: false, .. }]
    ));
    abfluss(&mut rx_a);

    dispatcher.dispatch(
        b,
        ClientEvent::VoiceTalking {
            room_id: raum("funk"),
            talking: true,
        },
    );
    assert!(matches!(
        abfluss(&mut rx_a).as_slice(),
        [ServerEvent::VoiceTalkingUpdate {
            connection_id,
            talking: true,
            ..
        }] if *connection_id == b
    ));
}

#[tokio::test]
async fn talk_ohne_voice_mitgliedschaft_wird_verworfen() {
    let (zustand, dispatcher) = aufbau();
    let (a, mut rx_a) = verbinden(&zustand, &dispatcher, "Alpha");
    let (c, mut rx_c) = verbinden(&zustand, &dispatcher, "Charlie");
    beitreten(&dispatcher, a, "funk");
    abfluss(&mut rx_a);
    abfluss(&mut rx_c);

    // C ist registriert, aber nicht im Voice-Raum
    dispatcher.dispatch(
        c,
        ClientEvent::VoiceTalking {
            room_id: raum("funk"),
            talking: true,
        },
    );

    // Stilles Verwerfen: kein Fehler, kein Broadcast, kein Sprecher
    assert!(abfluss(&mut rx_a).is_empty());
    assert!(abfluss(&mut rx_c).is_empty());
    assert_eq!(zustand.arbiter.sprecher(&raum("funk")), None);
}

#[tokio::test]
async fn sprecher_austritt_meldet_talking_false_zuerst() {
    let (zustand, dispatcher) = aufbau();
    let (a, mut rx_a) = verbinden(&zustand, &dispatcher, "Alpha");
    let (b, mut rx_b) = verbinden(&zustand, &dispatcher, "Bravo");
    beitreten(&dispatcher, a, "funk");
    beitreten(&dispatcher, b, "funk");
    dispatcher.dispatch(
        a,
        ClientEvent::VoiceTalking {
            room_id: raum("funk"),
            talking: true,
        },
    );
    abfluss(&mut rx_a);
    abfluss(&mut rx_b);

    dispatcher.dispatch(
        a,
        ClientEvent::LeaveVoice {
            room_id: raum("funk"),
        },
    );

    let bei_b = abfluss(&mut rx_b);
    assert_eq!(bei_b.len(), 3);
    assert!(matches!(
        &bei_b[0],
        ServerEvent::VoiceTalkingUpdate {
            connection_id,
            talking: false,
            ..
        } if *connection_id == a
    ));
    assert!(matches!(
        &bei_b[1],
        ServerEvent::VoiceParticipants { participants, .. } if participants.is_empty()
    ));
    assert!(matches!(
        &bei_b[2],
        ServerEvent::VoiceUserLeft { connection_id, .. } if *connection_id == a
    ));

    // Der Austretende war beim talking=false noch Teilnehmer
    let bei_a = abfluss(&mut rx_a);
    assert_eq!(bei_a.len(), 1);
    assert!(matches!(
        &bei_a[0],
        ServerEvent::VoiceTalkingUpdate { talking: false, .. }
    ));

    assert_eq!(zustand.arbiter.sprecher(&raum("funk")), None);
}

#[tokio::test]
async fn trennung_bereinigt_alle_voice_raeume() {
    let (zustand, dispatcher) = aufbau();
    let (a, mut rx_a) = verbinden(&zustand, &dispatcher, "Alpha");
    let (b, mut rx_b) = verbinden(&zustand, &dispatcher, "Bravo");
    let (c, mut rx_c) = verbinden(&zustand, &dispatcher, "Charlie");

    beitreten(&dispatcher, a, "eins");
    beitreten(&dispatcher, b, "eins");
    beitreten(&dispatcher, a, "zwei");
    beitreten(&dispatcher, c, "zwei");
    dispatcher.dispatch(
        a,
        ClientEvent::VoiceTalking {
            room_id: raum("eins"),
            talking: true,
        },
    );
    abfluss(&mut rx_a);
    abfluss(&mut rx_b);
    abfluss(&mut rx_c);

    dispatcher.verbindung_bereinigen(&a);

    // B sieht die volle Austrittssequenz aus "eins", dann die Nutzerliste
    let bei_b = abfluss(&mut rx_b);
    assert_eq!(bei_b.len(), 4);
    assert!(matches!(
        &bei_b[0],
        ServerEvent::VoiceTalkingUpdate {
            connection_id,
            talking: false,
            ..
        } if *connection_id == a
    ));
    assert!(matches!(
        &bei_b[1],
        ServerEvent::VoiceParticipants {
            room_id,
            participants,
        } if room_id.as_str() == "eins" && participants.is_empty()
    ));
    assert!(matches!(
        &bei_b[2],
        ServerEvent::VoiceUserLeft { connection_id, .. } if *connection_id == a
    ));
    assert!(matches!(
        &bei_b[3],
        ServerEvent::UserList { users } if users.len() == 2
    ));

    // C sieht nur den Austritt aus "zwei" und die Nutzerliste
    let bei_c = abfluss(&mut rx_c);
    assert_eq!(bei_c.len(), 3);
    assert!(matches!(
        &bei_c[0],
        ServerEvent::VoiceParticipants {
            room_id,
            participants,
        } if room_id.as_str() == "zwei" && participants.is_empty()
    ));
    assert!(matches!(
        &bei_c[1],
        ServerEvent::VoiceUserLeft { connection_id, .. } if *connection_id == a
    ));
    assert!(matches!(
        &bei_c[2],
        ServerEvent::UserList { users } if users.len() == 2
    ));

    assert_eq!(zustand.register.anzahl(), 2);
    assert!(!zustand.broadcaster.ist_registriert(&a));
    assert_eq!(zustand.voice.teilnehmer(&raum("eins")), vec![b]);
    assert_eq!(zustand.voice.teilnehmer(&raum("zwei")), vec![c]);
    assert_eq!(zustand.arbiter.sprecher(&raum("eins")), None);
}

#[tokio::test]
async fn relay_reicht_payload_unveraendert_weiter() {
    let (zustand, dispatcher) = aufbau();
    let (a, mut rx_a) = verbinden(&zustand, &dispatcher, "Alpha");
    let (b, mut rx_b) = verbinden(&zustand, &dispatcher, "Bravo");
    abfluss(&mut rx_a);
    abfluss(&mut rx_b);

    let angebot = json!({"sdp": "v=0 o=- 4611731400430051336", "typ": "offer"});
    dispatcher.dispatch(
        a,
        ClientEvent::VoiceOffer {
            to: b,
            payload: angebot.clone(),
        },
    );

    let bei_b = abfluss(&mut rx_b);
    assert_eq!(bei_b.len(), 1);
    match &bei_b[0] {
        ServerEvent::VoiceOffer { from, payload } => {
            assert_eq!(*from, a);
            assert_eq!(payload, &angebot);
        }
        sonst => panic!("voice_offer erwartet, war {:?}", sonst),
    }

    // Answer und ICE-Kandidat laufen denselben Weg zurueck
    let antwort = json!({"sdp": "v=0", "typ": "answer"});
    dispatcher.dispatch(
        b,
        ClientEvent::VoiceAnswer {
            to: a,
            payload: antwort.clone(),
        },
    );
    let kandidat = json!({"candidate": "candidate:1 1 UDP 2122252543", "sdpMLineIndex": 0});
    dispatcher.dispatch(
        b,
        ClientEvent::VoiceIceCandidate {
            to: a,
            payload: kandidat.clone(),
        },
    );

    let bei_a = abfluss(&mut rx_a);
    assert_eq!(bei_a.len(), 2);
    assert!(matches!(
        &bei_a[0],
        ServerEvent::VoiceAnswer { from, payload } if *from == b && *payload == antwort
    ));
    assert!(matches!(
        &bei_a[1],
        ServerEvent::VoiceIceCandidate { from, payload } if *from == b && *payload == kandidat
    ));
}

#[tokio::test]
async fn relay_an_unbekanntes_ziel_ist_still() {
    let (zustand, dispatcher) = aufbau();
    let (a, mut rx_a) = verbinden(&zustand, &dispatcher, "Alpha");
    abfluss(&mut rx_a);

    let ziel = ConnectionId::new();
    dispatcher.dispatch(
        a,
        ClientEvent::VoiceOffer {
            to: ziel,
            payload: json!({"sdp": "v=0"}),
        },
    );

    // Kein Fehler an den Absender
    assert!(abfluss(&mut rx_a).is_empty());
}
