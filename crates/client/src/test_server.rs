//! A real MedRef server on an ephemeral port, for client tests.

use api_rest::{router, AppState};
use api_shared::Medication;
use medref_core::{HpiEngine, HpiService, MedicationStore, ProviderStore, ReferenceService, StoredProvider};

fn medications() -> Vec<Medication> {
    vec![
        Medication {
            name: "Amiodarone".into(),
            description: "Class III antiarrhythmic".into(),
            alternate_names: vec!["Pacerone".into(), "Cordarone".into()],
            mechanism_of_action: "Blocks potassium channels".into(),
        },
        Medication {
            name: "Famotidine".into(),
            description: "H2 blocker".into(),
            alternate_names: vec!["Pepcid".into()],
            mechanism_of_action: "H2 receptor antagonist".into(),
        },
        Medication {
            name: "Ketamine".into(),
            description: "Dissociative anesthetic".into(),
            alternate_names: vec!["Ketalar".into()],
            mechanism_of_action: "NMDA receptor antagonist".into(),
        },
    ]
}

const PROVIDERS: &str = r#"[
    {"id": "2", "name": "Zoe Adams", "preferences": {"speed": "Fast", "note_pref": ["Bullet points"]}},
    {"id": "1", "name": "maria Lopez", "preferences": {"mdm": ["Reassess pain"], "dictation": "Dragon"}},
    {"id": "3", "name": "Ben Carter", "preferences": {}}
]"#;

/// Starts a server with fixture data and returns its base URL.
pub(crate) async fn spawn() -> String {
    let providers: Vec<StoredProvider> = serde_json::from_str(PROVIDERS).unwrap();
    let state = AppState {
        reference: ReferenceService::new(
            MedicationStore::from_records(medications()),
            ProviderStore::from_providers(providers),
            5,
        ),
        hpi: HpiService::new(HpiEngine::Template, false),
    };
    let app = router(state, std::env::temp_dir().join("medref-client-tests-no-web"));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}
