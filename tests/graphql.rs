use async_graphql::{Request, Variables};
use serde_json::{json, Value};
use tempfile::TempDir;
use time::format_description::well_known::Rfc3339;
use time::{Duration, OffsetDateTime};

use regcore::admin::{AdminManifest, CrudOperation, EntityKind};
use regcore::file::MediaStore;
use regcore::graphql::{build_schema, RegcoreSchema};

struct TestApi {
    schema: RegcoreSchema,
    media: TempDir,
}

impl TestApi {
    async fn new() -> Self {
        Self::with_manifest(AdminManifest::default()).await
    }

    async fn with_manifest(manifest: AdminManifest) -> Self {
        let pool = regcore::db::connect("sqlite::memory:").await.unwrap();
        let media = tempfile::tempdir().unwrap();
        let schema = build_schema(pool, MediaStore::new(media.path()), manifest);

        Self { schema, media }
    }

    async fn execute(&self, query: &str, variables: Value) -> Result<Value, Vec<String>> {
        let request = Request::new(query).variables(Variables::from_json(variables));
        let response = self.schema.execute(request).await;

        if response.errors.is_empty() {
            Ok(response.data.into_json().unwrap())
        } else {
            Err(response.errors.into_iter().map(|err| err.message).collect())
        }
    }

    async fn run(&self, query: &str, variables: Value) -> Value {
        match self.execute(query, variables).await {
            Ok(data) => data,
            Err(errors) => panic!("query failed: {:?}", errors),
        }
    }
}

fn rfc3339(at: OffsetDateTime) -> String {
    at.format(&Rfc3339).unwrap()
}

fn person() -> Value {
    json!({
        "firstName": "Jane",
        "lastName": "Doe",
        "badgeName": "Janie",
        "email": "jane@example.org",
        "pronouns": "she/her",
        "shirtSize": "MD",
        "birthDate": "1990-04-12",
        "agreesToConTos": true,
    })
}

const CREATE_DEPARTMENT: &str = r#"
    mutation {
        createDepartment(newDepartment: { name: "Registration" }) { id }
    }
"#;

const CREATE_STAFF: &str = r#"
    mutation ($newStaff: NewStaff!) {
        createStaff(newStaff: $newStaff) {
            id
            fullName
            topLevel
            supervisor { id }
        }
    }
"#;

#[tokio::test]
async fn manifest_lists_every_entity() {
    let api = TestApi::new().await;

    let data = api
        .run(
            "{ adminManifest { entities { entity pluralLabel operations } } }",
            json!({}),
        )
        .await;
    let entities = data["adminManifest"]["entities"].as_array().unwrap();

    assert_eq!(entities.len(), 9);
    assert_eq!(entities[0]["entity"], "EVENT");
    assert_eq!(entities[1]["pluralLabel"], "Charities");
    assert_eq!(entities[8]["entity"], "EMERGENCY_CONTACT");
    assert_eq!(
        entities[4]["operations"],
        json!(["CREATE", "READ", "UPDATE", "DELETE"])
    );
}

#[tokio::test]
async fn events_link_to_their_charity() {
    let api = TestApi::new().await;
    let charity = api
        .run(
            r#"mutation { createCharity(newCharity: { name: "Cat Rescue League", donations: "12.50" }) { id donations } }"#,
            json!({}),
        )
        .await;
    assert_eq!(charity["createCharity"]["donations"], "12.50");

    let data = api
        .run(
            r#"
            mutation ($newEvent: NewEvent!) {
                createEvent(newEvent: $newEvent) {
                    charity { name }
                    registrationWindow(kind: ATTENDEE) { isOpen(at: "2024-03-01T00:00:00Z") }
                }
            }
            "#,
            json!({
                "newEvent": {
                    "dealerRegStart": "2023-11-01T00:00:00Z",
                    "dealerRegEnd": "2024-03-31T23:59:59Z",
                    "staffRegStart": "2023-12-01T00:00:00Z",
                    "staffRegEnd": "2024-06-30T23:59:59Z",
                    "attendeeRegStart": "2024-01-01T00:00:00Z",
                    "attendeeRegEnd": "2024-06-30T23:59:59Z",
                    "onsiteRegStart": "2024-07-12T08:00:00Z",
                    "onsiteRegEnd": "2024-07-14T18:00:00Z",
                    "eventStart": "2024-07-12",
                    "eventEnd": "2024-07-14",
                    "charityId": charity["createCharity"]["id"],
                }
            }),
        )
        .await;

    assert_eq!(data["createEvent"]["charity"]["name"], "Cat Rescue League");
    assert_eq!(data["createEvent"]["registrationWindow"]["isOpen"], true);
}

#[tokio::test]
async fn top_level_staff_supervise_themselves() {
    let api = TestApi::new().await;
    let department = api.run(CREATE_DEPARTMENT, json!({})).await["createDepartment"]["id"].clone();

    let lead = api
        .run(
            CREATE_STAFF,
            json!({
                "newStaff": {
                    "person": person(),
                    "departmentId": department,
                    "needsRoom": false,
                }
            }),
        )
        .await;
    let lead = &lead["createStaff"];
    assert_eq!(lead["topLevel"], true);
    assert_eq!(lead["supervisor"]["id"], lead["id"]);
    assert_eq!(lead["fullName"], "Jane Doe");

    let report = api
        .run(
            CREATE_STAFF,
            json!({
                "newStaff": {
                    "person": person(),
                    "departmentId": department,
                    "supervisorId": lead["id"],
                    "needsRoom": true,
                }
            }),
        )
        .await;
    assert_eq!(report["createStaff"]["topLevel"], false);

    let data = api
        .run(
            "query ($id: Int!) { staffMember(id: $id) { reports { id } } }",
            json!({ "id": lead["id"] }),
        )
        .await;
    assert_eq!(
        data["staffMember"]["reports"],
        json!([{ "id": report["createStaff"]["id"] }])
    );
}

#[tokio::test]
async fn emergency_contacts_resolve_their_owner() {
    let api = TestApi::new().await;
    let attendee = api
        .run(
            "mutation ($newAttendee: NewAttendee!) { createAttendee(newAttendee: $newAttendee) { id } }",
            json!({
                "newAttendee": {
                    "person": person(),
                    "address1": "123 Main St",
                    "address2": "",
                    "zipCode": "30332",
                    "city": "Atlanta",
                    "state": "GA",
                    "country": "us",
                    "agreesToSurveys": false,
                    "requestVolunteerInfo": false,
                    "requestAsl": true,
                }
            }),
        )
        .await["createAttendee"]["id"]
        .clone();

    let data = api
        .run(
            r#"
            mutation ($ownerId: Int!) {
                createEmergencyContact(newContact: {
                    firstName: "Sam", lastName: "Doe", relation: "sibling",
                    ownerKind: ATTENDEE, ownerId: $ownerId
                }) {
                    fullName
                    phoneNumber
                    owner { ... on Attendee { id country } }
                }
            }
            "#,
            json!({ "ownerId": attendee }),
        )
        .await;
    let contact = &data["createEmergencyContact"];

    assert_eq!(contact["fullName"], "Sam Doe");
    assert_eq!(contact["phoneNumber"], "XXXXXXXXXX");
    assert_eq!(contact["owner"]["id"], attendee);
    assert_eq!(contact["owner"]["country"], "US");

    let errors = api
        .execute(
            r#"mutation {
                createEmergencyContact(newContact: {
                    firstName: "Sam", lastName: "Doe", relation: "sibling",
                    ownerKind: STAFF, ownerId: 5
                }) { id }
            }"#,
            json!({}),
        )
        .await
        .unwrap_err();
    assert_eq!(errors, ["No staff member with id 5"]);
}

fn attendee_input(email: &str, country: &str) -> Value {
    let mut person = person();
    person["email"] = json!(email);

    json!({
        "newAttendee": {
            "person": person,
            "address1": "123 Main St",
            "address2": "",
            "zipCode": "30332",
            "city": "Atlanta",
            "state": "GA",
            "country": country,
            "agreesToSurveys": false,
            "requestVolunteerInfo": false,
            "requestAsl": false,
        }
    })
}

#[tokio::test]
async fn malformed_attendee_input_is_refused() {
    let api = TestApi::new().await;
    let create =
        "mutation ($newAttendee: NewAttendee!) { createAttendee(newAttendee: $newAttendee) { id } }";

    assert!(api
        .execute(create, attendee_input("definitely not an email", "US"))
        .await
        .is_err());
    assert!(api
        .execute(create, attendee_input("jane@example.org", "ZZ"))
        .await
        .is_err());

    let data = api.run("{ attendees { id } }", json!({})).await;
    assert_eq!(data["attendees"], json!([]));

    let data = api
        .run(create, attendee_input("jane@example.org", "gb"))
        .await;
    assert!(data["createAttendee"]["id"].is_i64());
}

#[tokio::test]
async fn single_use_discounts_redeem_once() {
    let api = TestApi::new().await;
    let now = OffsetDateTime::now_utc();
    let discount = api
        .run(
            r#"
            mutation ($start: DateTime!, $end: DateTime!) {
                createDiscount(newDiscount: {
                    codeName: "STAFF50", percentOff: 50, startDate: $start, endDate: $end,
                    singleUse: true
                }) { id isValid }
            }
            "#,
            json!({
                "start": rfc3339(now - Duration::days(1)),
                "end": rfc3339(now + Duration::days(1)),
            }),
        )
        .await;
    assert_eq!(discount["createDiscount"]["isValid"], true);
    let id = discount["createDiscount"]["id"].clone();

    let redeemed = api
        .run(
            "mutation ($id: Int!) { redeemDiscount(id: $id) { used isValid } }",
            json!({ "id": id }),
        )
        .await;
    assert_eq!(redeemed["redeemDiscount"]["used"], 1);
    assert_eq!(redeemed["redeemDiscount"]["isValid"], false);

    let errors = api
        .execute(
            "mutation ($id: Int!) { redeemDiscount(id: $id) { used } }",
            json!({ "id": id }),
        )
        .await
        .unwrap_err();
    assert_eq!(errors, ["Discount STAFF50 is not valid"]);
}

#[tokio::test]
async fn option_images_are_stored_under_the_media_root() {
    let api = TestApi::new().await;
    let merch = api
        .run(
            r#"mutation { createMerchandise(newMerchandise: { name: "Shirt", quantity: 10, category: SHIRT }) { id } }"#,
            json!({}),
        )
        .await["createMerchandise"]["id"]
        .clone();
    let option = api
        .run(
            r#"
            mutation ($merchId: Int!) {
                createPriceLevelOption(newOption: {
                    name: "Basic", price: "25.00", merchId: $merchId, public: true
                }) { id display }
            }
            "#,
            json!({ "merchId": merch }),
        )
        .await;
    assert_eq!(option["createPriceLevelOption"]["display"], "Basic ($25.00)");
    let id = option["createPriceLevelOption"]["id"].clone();

    let data = api
        .run(
            "mutation ($id: Int!, $file: FileUpload) { setOptionImage(id: $id, file: $file) { optionImage } }",
            json!({
                "id": id,
                "file": { "path": "shirt.png", "content": base64::encode(b"png bytes") },
            }),
        )
        .await;
    let stored = data["setOptionImage"]["optionImage"].as_str().unwrap().to_owned();
    assert!(stored.starts_with("price_level/"));
    assert!(stored.ends_with("/shirt.png"));
    assert_eq!(
        std::fs::read(api.media.path().join(&stored)).unwrap(),
        b"png bytes"
    );

    let cleared = api
        .run(
            "mutation ($id: Int!) { setOptionImage(id: $id) { optionImage } }",
            json!({ "id": id }),
        )
        .await;
    assert_eq!(cleared["setOptionImage"]["optionImage"], Value::Null);
}

fn stored_files(dir: &std::path::Path) -> Vec<std::path::PathBuf> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).unwrap() {
        let path = entry.unwrap().path();
        if path.is_dir() {
            files.extend(stored_files(&path));
        } else {
            files.push(path);
        }
    }

    files
}

#[tokio::test]
async fn uploads_for_missing_records_are_not_kept() {
    let api = TestApi::new().await;
    let file = json!({ "path": "coc.pdf", "content": base64::encode(b"be excellent") });

    let errors = api
        .execute(
            "mutation ($file: FileUpload) { setEventCodeOfConduct(id: 404, file: $file) { id } }",
            json!({ "file": file }),
        )
        .await
        .unwrap_err();
    assert_eq!(errors, ["No event with id 404"]);

    let errors = api
        .execute(
            "mutation ($file: FileUpload) { setOptionImage(id: 404, file: $file) { id } }",
            json!({ "file": file }),
        )
        .await
        .unwrap_err();
    assert_eq!(errors, ["No price level option with id 404"]);

    assert!(stored_files(api.media.path()).is_empty());
}

#[tokio::test]
async fn operations_missing_from_the_manifest_are_refused() {
    let api = TestApi::with_manifest(
        AdminManifest::default().without(EntityKind::Department, CrudOperation::Delete),
    )
    .await;
    let department = api.run(CREATE_DEPARTMENT, json!({})).await["createDepartment"]["id"].clone();

    let errors = api
        .execute(
            "mutation ($id: Int!) { deleteDepartment(id: $id) }",
            json!({ "id": department }),
        )
        .await
        .unwrap_err();
    assert_eq!(errors, ["Delete is not allowed on Departments"]);

    let data = api.run("{ departments { name } }", json!({})).await;
    assert_eq!(data["departments"], json!([{ "name": "Registration" }]));
}
