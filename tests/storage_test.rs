//! Repository and service tests against a migrated SQLite database.

mod common;

use chrono::{NaiveDate, TimeZone, Utc};

use shift_bot::commands::seed::seed_demo_data;
use shift_bot::config::Config;
use shift_bot::domain::{
    AuthMethod, CheckinKind, DailyAggregate, Misses, NewCheckin, Role, UserProfile,
};
use shift_bot::errors::AppError;
use shift_bot::infra::UnitOfWork;
use shift_bot::services::{Aggregator, SettingsManager, SettingsService, StatsService};

fn profile(telegram_id: i64, username: &str) -> UserProfile {
    UserProfile {
        telegram_id,
        username: Some(username.to_string()),
        full_name: Some(username.to_string()),
    }
}

fn new_checkin(user_id: i32, chat_id: i32, kind: CheckinKind, date: NaiveDate) -> NewCheckin {
    NewCheckin {
        user_id,
        chat_id,
        kind,
        photo_file_id: format!("photo-{}", user_id),
        file_unique_id: format!("unique-{}", user_id),
        checkin_date: date,
    }
}

#[tokio::test]
async fn test_second_checkin_of_same_kind_and_day_conflicts() {
    let db = common::migrated_database().await;
    let uow = common::persistence(&db);

    let user = uow.users().upsert_profile(profile(10, "ivan"), None).await.unwrap();
    let chat = uow
        .chats()
        .get_or_create(-100, Some("Store".to_string()), "Europe/Sofia".to_string())
        .await
        .unwrap();
    let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();

    uow.checkins()
        .create(new_checkin(user.id, chat.id, CheckinKind::Morning, date))
        .await
        .unwrap();
    let duplicate = uow
        .checkins()
        .create(new_checkin(user.id, chat.id, CheckinKind::Morning, date))
        .await;
    assert!(matches!(duplicate, Err(AppError::Conflict(_))));

    // Other kind or other day is fine
    uow.checkins()
        .create(new_checkin(user.id, chat.id, CheckinKind::Evening, date))
        .await
        .unwrap();
    uow.checkins()
        .create(new_checkin(user.id, chat.id, CheckinKind::Morning, date.succ_opt().unwrap()))
        .await
        .unwrap();

    assert_eq!(uow.checkins().list_for_day(chat.id, date).await.unwrap().len(), 2);
    assert!(uow
        .checkins()
        .exists(user.id, chat.id, CheckinKind::Evening, date)
        .await
        .unwrap());
}

#[tokio::test]
async fn test_daily_stats_upsert_replaces_row() {
    let db = common::migrated_database().await;
    let uow = common::persistence(&db);
    let chat = uow
        .chats()
        .get_or_create(-200, None, "UTC".to_string())
        .await
        .unwrap();
    let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();

    let first = uow
        .stats()
        .upsert(DailyAggregate {
            chat_id: chat.id,
            date,
            morning_cnt: 1,
            evening_cnt: 0,
            total_operators: 2,
            misses: Misses {
                morning: vec![7],
                evening: vec![6, 7],
            },
        })
        .await
        .unwrap();
    let second = uow
        .stats()
        .upsert(DailyAggregate {
            chat_id: chat.id,
            date,
            morning_cnt: 2,
            evening_cnt: 2,
            total_operators: 2,
            misses: Misses::default(),
        })
        .await
        .unwrap();

    assert_eq!(first.id, second.id);
    let stored = uow.stats().find(chat.id, date).await.unwrap().unwrap();
    assert_eq!(stored.morning_cnt, 2);
    assert_eq!(stored.misses, Misses::default());
    assert_eq!(uow.stats().list_for_chats(vec![chat.id]).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_seed_is_idempotent() {
    let db = common::migrated_database().await;
    let uow = common::persistence(&db);
    let config = Config::default();

    assert!(seed_demo_data(uow.as_ref(), &config).await.unwrap());
    assert!(!seed_demo_data(uow.as_ref(), &config).await.unwrap());

    let owner = uow.users().find_by_telegram_id(1).await.unwrap().unwrap();
    let memberships = uow.memberships().list_for_user(owner.id).await.unwrap();
    assert_eq!(memberships.len(), 1);
    assert_eq!(memberships[0].role, Role::Manager);
    assert!(memberships[0].authorized);

    let chat = uow.chats().find_by_chat_id(12345).await.unwrap().unwrap();
    assert_eq!(chat.title.as_deref(), Some("Demo Chat"));
    assert_eq!(uow.chats().list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_duplicate_membership_is_conflict_and_authorize_reuses_row() {
    let db = common::migrated_database().await;
    let uow = common::persistence(&db);

    let user = uow.users().upsert_profile(profile(10, "ivan"), None).await.unwrap();
    let chat = uow
        .chats()
        .get_or_create(-100, None, "Europe/Sofia".to_string())
        .await
        .unwrap();

    let memberships = uow.memberships();
    memberships
        .create(user.id, chat.id, Role::Manager, false, None)
        .await
        .unwrap();
    let duplicate = memberships
        .create(user.id, chat.id, Role::Operator, true, Some(AuthMethod::Phone))
        .await;
    assert!(matches!(duplicate, Err(AppError::Conflict(_))));

    let authorized = memberships
        .authorize(user.id, chat.id, AuthMethod::Invite)
        .await
        .unwrap();
    assert_eq!(authorized.role, Role::Manager);
    assert!(authorized.authorized);
    assert_eq!(authorized.authorized_via, Some(AuthMethod::Invite));

    let other = uow.users().upsert_profile(profile(11, "petr"), None).await.unwrap();
    let (first, second) = tokio::join!(
        memberships.authorize(other.id, chat.id, AuthMethod::Captcha),
        memberships.set_role(other.id, chat.id, Role::Operator),
    );
    assert_eq!(first.unwrap().user_id, other.id);
    assert_eq!(second.unwrap().user_id, other.id);
    assert_eq!(memberships.list_for_user(other.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_nightly_aggregation_counts_checkins_and_misses() {
    let db = common::migrated_database().await;
    let uow = common::persistence(&db);

    SettingsManager::new(uow.clone(), Config::default())
        .ensure_global_defaults()
        .await
        .unwrap();

    let chat = uow
        .chats()
        .get_or_create(-300, Some("Kiosk".to_string()), "UTC".to_string())
        .await
        .unwrap();
    let early = uow.users().upsert_profile(profile(1, "early"), None).await.unwrap();
    let late = uow.users().upsert_profile(profile(2, "late"), None).await.unwrap();
    for user in [&early, &late] {
        uow.memberships()
            .authorize(user.id, chat.id, AuthMethod::Invite)
            .await
            .unwrap();
    }

    let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
    uow.checkins()
        .create(new_checkin(early.id, chat.id, CheckinKind::Morning, date))
        .await
        .unwrap();

    let now = Utc.with_ymd_and_hms(2024, 5, 2, 0, 10, 0).unwrap();
    let written = Aggregator::new(uow.clone())
        .aggregate_all(None, now)
        .await
        .unwrap();
    assert_eq!(written, 1);

    let stat = uow.stats().find(chat.id, date).await.unwrap().unwrap();
    assert_eq!(stat.morning_cnt, 1);
    assert_eq!(stat.evening_cnt, 0);
    assert_eq!(stat.total_operators, 2);
    assert_eq!(stat.misses.morning, vec![late.id]);
    assert_eq!(stat.misses.evening.len(), 2);
}
