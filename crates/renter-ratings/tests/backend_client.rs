use renter_ratings::api::{ApiError, BackendClient};
use renter_ratings::config::ApiConfig;
use renter_ratings::workflows::ratings::{
    HostId, RatingId, RatingPayload, RatingsGateway, RentalId, RenterId, Score,
};
use renter_ratings::workflows::reservations::{
    ReservationQuery, ReservationsGateway, SortDirection, SortKey, SortOrder,
};
use renter_ratings::workflows::reviews::{fetch_history, ReviewsGateway};
use renter_ratings::workflows::vehicles::{Availability, HostCarsGateway};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> BackendClient {
    let mut config = ApiConfig::new(server.uri());
    config.session_cookie = Some("session=host-token".to_string());
    BackendClient::new(&config).expect("client builds")
}

fn payload() -> RatingPayload {
    RatingPayload {
        behavior_score: Score::new(5).expect("valid"),
        car_care_score: Score::new(4).expect("valid"),
        punctuality_score: Score::new(5).expect("valid"),
        comment: "Buen cliente, cuidadoso".to_string(),
        reservation_id: RentalId("res-1".to_string()),
        rater_id: HostId("host-1".to_string()),
        ratee_id: RenterId("renter-1".to_string()),
    }
}

fn stored_rating(id: &str) -> serde_json::Value {
    json!({
        "id": id,
        "reservationId": "res-1",
        "calificadorId": "host-1",
        "calificadoId": "renter-1",
        "comportamiento": 5,
        "cuidadoVehiculo": 4,
        "puntualidad": 5,
        "comentario": "Buen cliente, cuidadoso",
        "fechaCreacion": "2025-05-10T12:00:00Z"
    })
}

#[tokio::test]
async fn completed_rentals_send_host_and_session_cookie() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/rentals/completed"))
        .and(query_param("hostId", "host-1"))
        .and(header("cookie", "session=host-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": "res-1",
            "renterId": "renter-1",
            "fechaInicio": "2025-05-01T09:00:00Z",
            "fechaFin": "2025-05-08T18:00:00Z",
            "estado": "completed",
            "renter": {
                "id": "renter-1",
                "firstName": "Ana",
                "lastName": "Rojas",
                "email": "ana@example.com",
                "phone": "70000000",
                "profilePicture": null
            },
            "vehicleImage": "https://cdn.example.com/kia.jpg"
        }])))
        .expect(1)
        .mount(&server)
        .await;

    let rentals = client(&server)
        .completed_rentals(&HostId("host-1".to_string()))
        .await
        .expect("rentals load");

    assert_eq!(rentals.len(), 1);
    assert_eq!(rentals[0].renter.full_name(), "Ana Rojas");
    assert_eq!(rentals[0].status, "completed");
}

#[tokio::test]
async fn ratings_are_filtered_by_rater_or_ratee() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/calificaciones"))
        .and(query_param("calificadorId", "host-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([stored_rating("cal-1")])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/calificaciones"))
        .and(query_param("calificadoId", "renter-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            stored_rating("cal-1"),
            stored_rating("cal-2")
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let by_host = client
        .ratings_by_rater(&HostId("host-1".to_string()))
        .await
        .expect("host ratings load");
    let for_renter = client
        .ratings_for_renter(&RenterId("renter-1".to_string()))
        .await
        .expect("renter ratings load");

    assert_eq!(by_host.len(), 1);
    assert_eq!(for_renter.len(), 2);
    assert_eq!(by_host[0].average(), 4.7);
}

#[tokio::test]
async fn create_update_and_delete_hit_the_rating_resource() {
    let server = MockServer::start().await;
    let body = serde_json::to_value(payload()).expect("payload serializes");

    Mock::given(method("POST"))
        .and(path("/api/calificaciones"))
        .and(body_json(body.clone()))
        .respond_with(ResponseTemplate::new(201).set_body_json(stored_rating("cal-9")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/calificaciones/cal-9"))
        .and(body_json(body))
        .respond_with(ResponseTemplate::new(200).set_body_json(stored_rating("cal-9")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/calificaciones/cal-9"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let created = client.create_rating(&payload()).await.expect("created");
    assert_eq!(created.id, RatingId("cal-9".to_string()));

    let updated = client
        .update_rating(&created.id, &payload())
        .await
        .expect("updated");
    assert_eq!(updated.comment_text(), "Buen cliente, cuidadoso");

    client.delete_rating(&created.id).await.expect("deleted");
}

#[tokio::test]
async fn rejections_carry_status_and_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/calificaciones"))
        .respond_with(
            ResponseTemplate::new(409).set_body_json(json!({ "error": "rating already exists" })),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/rentals/completed"))
        .respond_with(ResponseTemplate::new(401).set_body_string("<html>login</html>"))
        .mount(&server)
        .await;

    let client = client(&server);
    let err = client
        .create_rating(&payload())
        .await
        .expect_err("conflict");
    assert_eq!(err.status(), Some(409));
    match err {
        ApiError::Status { message, .. } => assert_eq!(message, "rating already exists"),
        other => panic!("expected status error, got {other:?}"),
    }

    let err = client
        .completed_rentals(&HostId("host-1".to_string()))
        .await
        .expect_err("unauthorized");
    match err {
        ApiError::Status {
            status, message, ..
        } => {
            assert_eq!(status, 401);
            assert_eq!(message, "Unauthorized");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn malformed_bodies_surface_as_decode_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/calificaciones"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "unexpected": true })))
        .mount(&server)
        .await;

    let err = client(&server)
        .ratings_by_rater(&HostId("host-1".to_string()))
        .await
        .expect_err("decode fails");
    assert!(matches!(err, ApiError::Decode { .. }));
    assert_eq!(err.status(), None);
}

#[tokio::test]
async fn reservations_forward_paging_and_sort_parameters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/reservations"))
        .and(query_param("hostId", "host-1"))
        .and(query_param("page", "2"))
        .and(query_param("limit", "5"))
        .and(query_param("sortKey", "fechaFin"))
        .and(query_param("sortDirection", "descending"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{
                "id": "res-7",
                "marca": "Toyota",
                "modelo": "Yaris",
                "nombreUsuario": "Ana Rojas",
                "fechaInicio": "2025-04-01T09:00:00Z",
                "fechaFin": "2025-04-05T09:00:00Z",
                "estado": "Completada"
            }],
            "pagination": { "total": 7 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let query = ReservationQuery {
        host: HostId("host-1".to_string()),
        page: 2,
        limit: 5,
        sort: Some(SortOrder {
            key: SortKey::EndDate,
            direction: SortDirection::Descending,
        }),
    };
    let page = client(&server)
        .reservations(&query)
        .await
        .expect("page loads");

    assert_eq!(page.data.len(), 1);
    assert_eq!(page.data[0].vehicle(), "Toyota Yaris");
    assert_eq!(page.total_pages(5), 2);
}

#[tokio::test]
async fn host_cars_are_listed_by_host_path() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/host-cars/host-1"))
        .and(header("cookie", "session=host-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "autos": [
                {
                    "id": 3,
                    "vin": "JTDBR32E720012345",
                    "año": 2019,
                    "marca": "Kia",
                    "modelo": "Rio",
                    "placa": "3321-PLT",
                    "asientos": 5,
                    "puertas": 4,
                    "soat": true,
                    "precio_por_dia": 28,
                    "num_mantenimientos": 1,
                    "transmision": "Manual",
                    "estado": "Reservado",
                    "direccion": "Calle Sucre",
                    "ciudad": { "nombre": "La Paz" },
                    "combustibles": [{ "tipoDeCombustible": "GNV" }],
                    "caracteristicas": [],
                    "imagenes": []
                }
            ],
            "total": 1,
            "autos_con_placa": 1
        })))
        .expect(1)
        .mount(&server)
        .await;

    let fleet = client(&server)
        .host_cars(&HostId("host-1".to_string()))
        .await
        .expect("cars load");

    assert_eq!(fleet.total, 1);
    let rio = fleet.find(3).expect("listed");
    assert_eq!(rio.name(), "Kia Rio");
    assert_eq!(rio.daily_price, 28.0);
    assert_eq!(rio.city_name(), "La Paz");
    assert_eq!(rio.availability(), Availability::Reserved);
}

#[tokio::test]
async fn unknown_host_cars_surface_the_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/host-cars/ghost"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "error": "Host no encontrado" })),
        )
        .mount(&server)
        .await;

    let err = client(&server)
        .host_cars(&HostId("ghost".to_string()))
        .await
        .expect_err("missing host");

    assert_eq!(err.status(), Some(404));
    assert!(err.to_string().contains("Host no encontrado"));
}

fn stored_review(id: &str, car_id: Option<&str>, rating: f64, created_at: &str) -> serde_json::Value {
    json!({
        "id": id,
        "renterId": "renter-1",
        "hostId": "host-1",
        "reservationId": format!("res-{id}"),
        "carId": car_id,
        "rating": rating,
        "behaviorRating": 4,
        "carCareRating": 5,
        "punctualityRating": 4,
        "comment": "Auto limpio y puntual",
        "hostName": "Marta Vega",
        "hostPicture": null,
        "renterName": "Ana Rojas",
        "createdAt": created_at,
        "updatedAt": created_at
    })
}

#[tokio::test]
async fn review_history_joins_each_car_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/reviews"))
        .and(query_param("hostId", "host-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            stored_review("rev-1", Some("car-7"), 4.5, "2025-03-02T10:00:00Z"),
            stored_review("rev-2", Some("car-7"), 3.0, "2025-03-05T10:00:00Z"),
            stored_review("rev-3", Some("car-9"), 5.0, "2025-03-08T10:00:00Z"),
            stored_review("rev-4", None, 2.0, "2025-03-09T10:00:00Z"),
        ])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/cars/car-7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 7,
            "marca": "Toyota",
            "modelo": "Corolla",
            "año": 2021,
            "imagenes": [{ "url": "https://cdn.example.com/corolla.jpg" }]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/cars/car-9"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "error": "db down" })))
        .expect(1)
        .mount(&server)
        .await;

    let reviews = fetch_history(&client(&server), &HostId("host-1".to_string()))
        .await
        .expect("history loads");

    assert_eq!(reviews.len(), 4);
    let corolla = reviews[0].car.as_ref().expect("car joined");
    assert_eq!(corolla.brand, "Toyota");
    assert_eq!(corolla.year, Some(2021));
    assert_eq!(corolla.images.len(), 1);
    assert_eq!(reviews[1].car, reviews[0].car);
    assert!(reviews[2].car.is_none());
    assert!(reviews[3].car.is_none());
    assert_eq!(reviews[0].rating, 4.5);
    assert_eq!(reviews[0].comment_text(), "Auto limpio y puntual");
}

#[tokio::test]
async fn review_history_fails_when_the_list_fails() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/reviews"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "message": "No autenticado" })))
        .mount(&server)
        .await;

    let client = client(&server);
    let err = client
        .host_reviews(&HostId("host-1".to_string()))
        .await
        .expect_err("unauthenticated");
    assert_eq!(err.status(), Some(401));
}
