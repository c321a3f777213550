//! Demo data for a fresh database.

use careflow_core::{
    errors::ClinicResult,
    models::{appointment::AppointmentFields, client::ClientFields},
};
use chrono::{Duration, SubsecRound, Utc};
use tracing::info;

use crate::repositories::ClinicStore;

const DEMO_CLIENTS: [(&str, &str, &str); 20] = [
    ("Alice Smith", "alice@example.com", "123-456-7890"),
    ("Bob Jones", "bob@example.com", "987-654-3210"),
    ("Charlie Brown", "charlie@example.com", "555-123-4567"),
    ("Diana Prince", "diana@example.com", "111-222-3333"),
    ("Ethan Hunt", "ethan@example.com", "444-555-6666"),
    ("Fiona Green", "fiona@example.com", "777-888-9999"),
    ("George Washington", "george@example.com", "222-333-4444"),
    ("Hannah Thompson", "hannah@example.com", "666-777-8888"),
    ("Isaac Johnson", "isaac@example.com", "333-444-5555"),
    ("Julia Roberts", "julia@example.com", "888-999-0000"),
    ("Kevin Parker", "kevin@example.com", "999-888-7777"),
    ("Laura King", "laura@example.com", "123-789-4560"),
    ("Michael Scott", "michael@example.com", "555-666-7777"),
    ("Natalie Brooks", "natalie@example.com", "444-222-1111"),
    ("Oliver Stone", "oliver@example.com", "777-333-2222"),
    ("Paula Adams", "paula@example.com", "101-202-3030"),
    ("Quentin Blake", "quentin@example.com", "404-505-6060"),
    ("Rachel Green", "rachel@example.com", "707-808-9090"),
    ("Samuel Lee", "samuel@example.com", "212-343-4545"),
    ("Tina Turner", "tina@example.com", "565-676-7878"),
];

/// Loads the demo clients, each with one past appointment, unless the store
/// already holds clients. Returns how many clients were created.
pub async fn seed_database(store: &dyn ClinicStore) -> ClinicResult<usize> {
    if store.count_clients().await? > 0 {
        info!("Database already has clients, skipping seed");
        return Ok(0);
    }

    let now = Utc::now().trunc_subsecs(0);

    for (days_ago, (name, email, phone)) in (1..).zip(DEMO_CLIENTS) {
        let client = store
            .create_client(
                &ClientFields {
                    name: name.to_string(),
                    email: email.to_string(),
                    phone: phone.to_string(),
                },
                None,
            )
            .await?;

        store
            .create_appointment(
                &AppointmentFields {
                    client_id: client.id,
                    scheduled_at: now - Duration::days(days_ago),
                    notes: None,
                },
                None,
            )
            .await?;
    }

    info!("Seeded {} clients with appointments", DEMO_CLIENTS.len());
    Ok(DEMO_CLIENTS.len())
}
