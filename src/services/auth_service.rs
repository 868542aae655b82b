//! Authorization service - binds a Telegram user to a team chat.
//!
//! Three methods are supported: a shared phone contact, a small arithmetic
//! captcha and a configured invite code. All of them end in the same
//! upsert of user, chat and membership.

use async_trait::async_trait;
use rand::seq::SliceRandom;
use rand::Rng;
use std::sync::Arc;

use crate::config::{Config, CAPTCHA_VARIANTS};
use crate::domain::{AuthMethod, Membership, PhoneVerification, UserProfile};
use crate::errors::AppResult;
use crate::infra::UnitOfWork;
use crate::utils::hash_phone;

/// Captcha question with shuffled answer options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Captcha {
    pub a: i32,
    pub b: i32,
    pub options: Vec<i32>,
}

impl Captcha {
    /// Pick one of the fixed variants and shuffle answer, answer+1, answer-1.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let (a, b) = CAPTCHA_VARIANTS
            .choose(rng)
            .copied()
            .unwrap_or((3, 4));
        let answer = a + b;
        let mut options = vec![answer, answer + 1, answer - 1];
        options.shuffle(rng);

        Self { a, b, options }
    }

    pub fn answer(&self) -> i32 {
        self.a + self.b
    }
}

/// Authorization service trait for dependency injection.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Upsert the user profile and the target chat, then authorize the
    /// membership with `method`. A new membership is an authorized OPERATOR.
    async fn authorize(
        &self,
        profile: UserProfile,
        target_chat_id: i64,
        method: AuthMethod,
        phone: Option<PhoneVerification>,
    ) -> AppResult<Membership>;

    /// Salted digest of a shared phone number.
    fn verify_phone(&self, phone_number: &str) -> PhoneVerification;

    /// Compare a submitted invite code with the configured one.
    fn check_invite(&self, code: &str) -> bool;

    /// Fresh captcha question.
    fn new_captcha(&self) -> Captcha;
}

/// Concrete implementation of AuthService using Unit of Work.
pub struct Authenticator<U: UnitOfWork> {
    uow: Arc<U>,
    config: Config,
}

impl<U: UnitOfWork> Authenticator<U> {
    pub fn new(uow: Arc<U>, config: Config) -> Self {
        Self { uow, config }
    }
}

#[async_trait]
impl<U: UnitOfWork> AuthService for Authenticator<U> {
    async fn authorize(
        &self,
        profile: UserProfile,
        target_chat_id: i64,
        method: AuthMethod,
        phone: Option<PhoneVerification>,
    ) -> AppResult<Membership> {
        let telegram_id = profile.telegram_id;
        let user = self.uow.users().upsert_profile(profile, phone).await?;
        let chat = self
            .uow
            .chats()
            .get_or_create(target_chat_id, None, self.config.timezone.name().to_string())
            .await?;
        let membership = self
            .uow
            .memberships()
            .authorize(user.id, chat.id, method)
            .await?;

        tracing::info!(
            telegram_id,
            chat_id = target_chat_id,
            method = %method,
            "User authorized"
        );

        Ok(membership)
    }

    fn verify_phone(&self, phone_number: &str) -> PhoneVerification {
        hash_phone(self.config.phone_salt(), phone_number)
    }

    fn check_invite(&self, code: &str) -> bool {
        self.config.invite_code_matches(code)
    }

    fn new_captcha(&self) -> Captcha {
        Captcha::generate(&mut rand::thread_rng())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Chat, Role, User};
    use crate::services::test_support::Mocks;
    use chrono::Utc;
    use mockall::predicate::eq;

    fn user(id: i32, telegram_id: i64) -> User {
        User {
            id,
            telegram_id,
            username: Some("ivan".to_string()),
            full_name: Some("Ivan".to_string()),
            phone_last4: None,
            phone_sha256: None,
            phone_verified_at: None,
            dm_blocked: false,
            locale: None,
            created_at: Utc::now(),
        }
    }

    fn chat(id: i32, chat_id: i64) -> Chat {
        Chat {
            id,
            chat_id,
            title: None,
            timezone: "Europe/Sofia".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_captcha_options_contain_the_answer() {
        let mut rng = rand::thread_rng();
        for _ in 0..20 {
            let captcha = Captcha::generate(&mut rng);
            assert!(CAPTCHA_VARIANTS.contains(&(captcha.a, captcha.b)));
            let mut options = captcha.options.clone();
            options.sort_unstable();
            let answer = captcha.answer();
            assert_eq!(options, vec![answer - 1, answer, answer + 1]);
        }
    }

    #[tokio::test]
    async fn test_authorize_upserts_user_chat_and_membership() {
        let mut mocks = Mocks::default();
        mocks.users
            .expect_upsert_profile()
            .withf(|profile, phone| profile.telegram_id == 42 && phone.is_none())
            .returning(|profile, _| Ok(user(7, profile.telegram_id)));
        mocks.chats
            .expect_get_or_create()
            .with(eq(-100_i64), eq(None), eq("Europe/Sofia".to_string()))
            .returning(|chat_id, _, _| Ok(chat(3, chat_id)));
        mocks.memberships
            .expect_authorize()
            .with(eq(7), eq(3), eq(AuthMethod::Captcha))
            .returning(|user_id, chat_id, method| {
                Ok(Membership {
                    id: 1,
                    user_id,
                    chat_id,
                    role: Role::Operator,
                    authorized: true,
                    authorized_via: Some(method),
                    created_at: Utc::now(),
                    updated_at: Utc::now(),
                })
            });

        let service = Authenticator::new(mocks.into_uow(), Config::default());
        let profile = UserProfile {
            telegram_id: 42,
            username: Some("ivan".to_string()),
            full_name: Some("Ivan".to_string()),
        };
        let membership = service
            .authorize(profile, -100, AuthMethod::Captcha, None)
            .await
            .unwrap();

        assert!(membership.is_authorized_operator());
        assert_eq!(membership.authorized_via, Some(AuthMethod::Captcha));
    }

    #[test]
    fn test_invite_and_phone_helpers_use_config() {
        let config = Config::default()
            .with_invite_code("777")
            .with_phone_salt("salt");
        let service = Authenticator::new(Mocks::default().into_uow(), config);

        assert!(service.check_invite(" 777 "));
        assert!(!service.check_invite("123456"));
        assert_eq!(
            service.verify_phone("+359888123456"),
            hash_phone("salt", "+359888123456")
        );
    }
}
