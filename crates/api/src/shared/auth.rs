use crate::error::DoseTrackError;
use actix_web::HttpRequest;
use dosetrack_domain::ID;

/// Header the authenticating reverse proxy forwards the verified user
/// identity in. The core never performs authentication itself, it only
/// receives a trusted identity.
const USER_ID_HEADER: &str = "x-user-id";

/// Resolves the acting identity of the request
pub fn protect_route(http_req: &HttpRequest) -> Result<ID, DoseTrackError> {
    let header = http_req
        .headers()
        .get(USER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| {
            DoseTrackError::Unauthorized(format!(
                "Missing or invalid `{}` header",
                USER_ID_HEADER
            ))
        })?;

    header
        .parse::<ID>()
        .map_err(|e| DoseTrackError::Unauthorized(format!("{}", e)))
}

#[cfg(test)]
mod test {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn it_resolves_the_forwarded_identity() {
        let user_id = ID::default();
        let req = TestRequest::default()
            .insert_header((USER_ID_HEADER, user_id.as_string()))
            .to_http_request();
        assert_eq!(protect_route(&req).unwrap(), user_id);
    }

    #[test]
    fn it_rejects_requests_without_identity() {
        let req = TestRequest::default().to_http_request();
        assert!(protect_route(&req).is_err());

        let req = TestRequest::default()
            .insert_header((USER_ID_HEADER, "not-an-id"))
            .to_http_request();
        assert!(protect_route(&req).is_err());
    }
}
