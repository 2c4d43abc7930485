use spinhall_session::identity::{
    AuthErrorCode, AuthService, IdentityProvider, InMemoryIdentityProvider, UserProfile,
};

fn service() -> AuthService<InMemoryIdentityProvider> {
    AuthService::new(InMemoryIdentityProvider::new())
}

async fn registered() -> (AuthService<InMemoryIdentityProvider>, UserProfile) {
    let auth = service();
    let user = auth
        .register("ann@example.com", "hunter22", "Ann")
        .await
        .expect("register");
    auth.logout();
    (auth, user)
}

#[tokio::test]
async fn register_signs_the_user_in() {
    let auth = service();
    let mut rx = auth.subscribe();
    assert!(rx.borrow_and_update().is_none());

    let user = auth
        .register("ann@example.com", "hunter22", "Ann")
        .await
        .expect("register");
    assert_eq!(user.display_name, "Ann");
    assert!(rx.has_changed().expect("service alive"));
    assert_eq!(auth.current_user(), Some(user));

    auth.logout();
    assert_eq!(auth.current_user(), None);
}

#[tokio::test]
async fn login_round_trip() {
    let (auth, user) = registered().await;
    let signed_in = auth
        .login("ANN@example.com", "hunter22")
        .await
        .expect("login");
    assert_eq!(signed_in.uid, user.uid);
    assert_eq!(auth.current_user().map(|u| u.uid), Some(user.uid));
}

#[tokio::test]
async fn local_validation_runs_before_the_provider() {
    let auth = service();
    assert_eq!(
        auth.login("", "secret").await,
        Err(AuthErrorCode::MissingField)
    );
    assert_eq!(
        auth.login("ann@example.com", "").await,
        Err(AuthErrorCode::MissingField)
    );
    assert_eq!(
        auth.login("not-an-email", "secret").await,
        Err(AuthErrorCode::InvalidEmail)
    );
    assert_eq!(
        auth.register("ann@example.com", "12345", "Ann").await,
        Err(AuthErrorCode::WeakPassword)
    );
    assert_eq!(
        auth.register("ann@example.com", "hunter22", "  ").await,
        Err(AuthErrorCode::MissingField)
    );
    assert_eq!(auth.current_user(), None);
}

#[tokio::test]
async fn provider_failures_are_structured() {
    let (auth, _) = registered().await;

    assert_eq!(
        auth.login("bob@example.com", "hunter22").await,
        Err(AuthErrorCode::UserNotFound)
    );
    assert_eq!(
        auth.login("ann@example.com", "wrong-pass").await,
        Err(AuthErrorCode::WrongPassword)
    );
    assert_eq!(
        auth.register("ann@example.com", "another1", "Ann again").await,
        Err(AuthErrorCode::EmailAlreadyInUse)
    );
    assert_eq!(
        auth.reset_password("bob@example.com").await,
        Err(AuthErrorCode::UserNotFound)
    );
}

#[tokio::test]
async fn repeated_wrong_passwords_are_throttled() {
    let (auth, _) = registered().await;
    for _ in 0..5 {
        assert_eq!(
            auth.login("ann@example.com", "wrong-pass").await,
            Err(AuthErrorCode::WrongPassword)
        );
    }
    assert_eq!(
        auth.login("ann@example.com", "hunter22").await,
        Err(AuthErrorCode::TooManyRequests)
    );
}

#[tokio::test]
async fn disabled_and_offline_accounts() {
    let (auth, _) = registered().await;
    assert!(auth.provider().disable("ann@example.com"));
    assert_eq!(
        auth.login("ann@example.com", "hunter22").await,
        Err(AuthErrorCode::UserDisabled)
    );

    auth.provider().set_offline(true);
    assert_eq!(
        auth.reset_password("ann@example.com").await,
        Err(AuthErrorCode::NetworkUnavailable)
    );
}

#[tokio::test]
async fn reset_password_is_recorded() {
    let (auth, _) = registered().await;
    auth.reset_password("Ann@Example.com")
        .await
        .expect("reset");
    assert_eq!(auth.provider().reset_requests(), vec!["ann@example.com"]);
}

#[tokio::test]
async fn provider_can_be_used_directly() {
    let provider = InMemoryIdentityProvider::new();
    assert_eq!(
        provider.register("ann@example.com", "123", "Ann").await,
        Err(AuthErrorCode::WeakPassword)
    );
}

#[test]
fn every_code_has_catalog_text() {
    let codes = [
        AuthErrorCode::InvalidEmail,
        AuthErrorCode::UserNotFound,
        AuthErrorCode::WrongPassword,
        AuthErrorCode::EmailAlreadyInUse,
        AuthErrorCode::WeakPassword,
        AuthErrorCode::TooManyRequests,
        AuthErrorCode::NetworkUnavailable,
        AuthErrorCode::UserDisabled,
        AuthErrorCode::MissingField,
        AuthErrorCode::Unknown,
    ];
    let mut seen = std::collections::HashSet::new();
    for code in codes {
        assert!(!code.message().is_empty());
        assert!(seen.insert(code.message()), "duplicate text for {:?}", code);
    }
}
