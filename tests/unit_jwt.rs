use folio::folio_auth::{
    AuthError, TokenService, create_access_token, create_refresh_token, verify_refresh_token,
    verify_token,
};
use folio::folio_config::JwtConfig;

fn get_test_jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "test_secret_key_for_testing_purposes".to_string(),
        token_name: "portfolio_token".to_string(),
        access_token_expiry: 3600,
        refresh_token_expiry: 604800,
        refresh_window: 300,
    }
}

#[test]
fn test_create_and_verify_access_token() {
    let jwt_config = get_test_jwt_config();

    let token = create_access_token(42, 3, &jwt_config).unwrap();
    let claims = verify_token(&token, &jwt_config).unwrap();

    assert_eq!(claims.user_id().unwrap(), 42);
    assert_eq!(claims.role_id, 3);
    assert_eq!(claims.exp - claims.iat, 3600);
}

#[test]
fn test_verify_token_wrong_secret() {
    let jwt_config = get_test_jwt_config();
    let token = create_access_token(1, 1, &jwt_config).unwrap();

    let other = JwtConfig {
        secret: "a_completely_different_secret_value".to_string(),
        ..get_test_jwt_config()
    };

    assert!(matches!(verify_token(&token, &other), Err(AuthError::Invalid)));
}

#[test]
fn test_verify_token_garbage() {
    let jwt_config = get_test_jwt_config();

    for token in ["", "not.a.token", "header.payload"] {
        assert!(verify_token(token, &jwt_config).is_err(), "{token:?}");
    }
}

#[test]
fn test_access_and_refresh_tokens_are_not_interchangeable() {
    let jwt_config = get_test_jwt_config();
    let access = create_access_token(7, 2, &jwt_config).unwrap();
    let refresh = create_refresh_token(7, 2, &jwt_config).unwrap();

    assert!(verify_refresh_token(&access, &jwt_config).is_err());
    assert!(verify_token(&refresh, &jwt_config).is_err());
    assert_eq!(verify_refresh_token(&refresh, &jwt_config).unwrap().role_id, 2);
}

#[test]
fn test_refresh_tokens_are_unique() {
    let jwt_config = get_test_jwt_config();

    let first = create_refresh_token(7, 2, &jwt_config).unwrap();
    let second = create_refresh_token(7, 2, &jwt_config).unwrap();

    assert_ne!(first, second);
}

#[test]
fn test_token_service_refresh_flow() {
    let service = TokenService::new(get_test_jwt_config());
    let issued = service.issue(9, 4, true).unwrap();

    let validated = service.validate_and_refresh(&issued.access).unwrap();
    assert!(validated.reissued.is_none());

    let refreshed = service
        .refresh_from_token(issued.refresh.as_deref().unwrap())
        .unwrap();
    let reissued = refreshed.reissued.expect("new access token");
    assert_eq!(verify_token(&reissued, service.config()).unwrap().user_id().unwrap(), 9);
}
