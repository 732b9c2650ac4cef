use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use teloxide::types::{ChatId, ParseMode, UserId};

use crate::{
    config::AppConfig,
    gateway::ChatMember,
    router::DeliveryMethod,
    service::game::RandomDice,
    storage::Store,
    utils::test::{inbound, TestBot},
};

const CHAT: ChatId = ChatId(-100500);

fn today() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 9, 2, 15, 30, 0).unwrap()
}

async fn set_growth(bot: &TestBot, user_id: u64, growth: i64) {
    let mut user = bot.store.get_user(UserId(user_id), CHAT).await.unwrap();
    user.growth = growth;
    bot.store.save_user(&user).await.unwrap();
}

#[tokio::test]
async fn test_new_user_gets_welcome_message() {
    let bot = TestBot::with_dice(|dice| dice.rolls([5]).chances([true, false]));

    let directive = bot
        .router
        .route_at(&inbound(CHAT, 10, Some("ann"), "/grow"), today())
        .await
        .unwrap();

    assert_eq!(
        directive.body(),
        Some(t!("growth.welcome", name = "@ann", value = 5).as_ref())
    );
    let user = bot.store.get_user(UserId(10), CHAT).await.unwrap();
    assert_eq!(user.growth, 5);
    assert_eq!(user.attempts_left, 0);
    let stats = bot.store.get_stats(UserId(10), CHAT).await.unwrap();
    assert_eq!(stats.counters.growth_up, 1);
    assert_eq!(stats.counters.growth_down, 0);
    assert_eq!(bot.gateway.deleted().len(), 1);
}

#[tokio::test]
async fn test_negative_total_recovers_above_zero() {
    let bot = TestBot::with_dice(|dice| dice.rolls([2, 4]).chances([false, true, false]));
    set_growth(&bot, 10, -3).await;

    let directive = bot
        .router
        .route_at(&inbound(CHAT, 10, Some("ann"), "/grow"), today())
        .await
        .unwrap();

    let user = bot.store.get_user(UserId(10), CHAT).await.unwrap();
    assert_eq!(user.growth, 1);
    assert_eq!(
        directive.body(),
        Some(t!("growth.changed", name = "@ann", old = -3, new = 1).as_ref())
    );
}

#[tokio::test]
async fn test_second_play_on_same_day_is_rejected() {
    let bot = TestBot::with_dice(|dice| dice.rolls([5]).chances([true, false]));
    let first = inbound(CHAT, 10, Some("ann"), "/grow");
    bot.router.route_at(&first, today()).await.unwrap();
    let before = bot.store.get_user(UserId(10), CHAT).await.unwrap();

    let directive = bot
        .router
        .route_at(&inbound(CHAT, 10, Some("ann"), "/grow"), today() + Duration::hours(3))
        .await
        .unwrap();

    assert_eq!(
        directive.body(),
        Some(t!("growth.already_played", name = "@ann").as_ref())
    );
    let after = bot.store.get_user(UserId(10), CHAT).await.unwrap();
    assert_eq!(after.growth, before.growth);
    assert_eq!(after.attempts_left, 0);
    assert_eq!(after.changed_at, before.changed_at);
}

#[tokio::test]
async fn test_quota_resets_on_next_day() {
    let bot = TestBot::with_dice(|dice| dice.rolls([5, 2]).chances([true, false, true, false]));
    bot.router
        .route_at(&inbound(CHAT, 10, Some("ann"), "/grow"), today())
        .await
        .unwrap();

    let tomorrow = Utc.with_ymd_and_hms(2024, 9, 3, 0, 0, 1).unwrap();
    bot.router
        .route_at(&inbound(CHAT, 10, Some("ann"), "/grow"), tomorrow)
        .await
        .unwrap();

    let user = bot.store.get_user(UserId(10), CHAT).await.unwrap();
    assert_eq!(user.growth, 7);
    assert_eq!(user.changed_at, tomorrow);
}

#[tokio::test]
async fn test_non_admin_cannot_bind_calendar() {
    let bot = TestBot::new();
    bot.gateway.add_admin(
        CHAT,
        ChatMember {
            id: UserId(99),
            username: Some("boss".into()),
            first_name: "Boss".into(),
        },
    );

    let directive = bot
        .router
        .route(&inbound(CHAT, 10, Some("ann"), "/add_calendar team@group.calendar.google.com"))
        .await
        .unwrap();

    assert_eq!(directive.body(), Some(t!("calendar.forbidden").as_ref()));
    assert_eq!(bot.store.calendar_id(CHAT).await.unwrap(), None);

    bot.router
        .route(&inbound(CHAT, 99, Some("boss"), "/add_calendar team@group.calendar.google.com"))
        .await
        .unwrap();
    assert_eq!(
        bot.store.calendar_id(CHAT).await.unwrap().as_deref(),
        Some("team@group.calendar.google.com")
    );
}

#[tokio::test]
async fn test_roster_failure_denies_admin() {
    let bot = TestBot::new();
    bot.gateway.add_admin(
        CHAT,
        ChatMember {
            id: UserId(99),
            username: Some("boss".into()),
            first_name: "Boss".into(),
        },
    );
    bot.gateway.fail_roster(true);

    let directive = bot
        .router
        .route(&inbound(CHAT, 99, Some("boss"), "/add_calendar abc"))
        .await
        .unwrap();

    assert_eq!(directive.body(), Some(t!("calendar.forbidden").as_ref()));
    assert_eq!(bot.store.calendar_id(CHAT).await.unwrap(), None);
}

#[tokio::test]
async fn test_active_flow_consumes_other_commands() {
    let bot = TestBot::new();
    let ann = |text: &str| inbound(CHAT, 10, Some("ann"), text);

    let start = bot.router.route_at(&ann("/add_homework"), today()).await.unwrap();
    assert!(matches!(
        start.method,
        DeliveryMethod::SendTextWithKeyboard { ref buttons, .. } if buttons == &vec!["Math".to_string(), "History".to_string()]
    ));

    bot.router.route_at(&ann("/grow"), today()).await.unwrap();
    bot.router.route_at(&ann("/top"), today()).await.unwrap();
    let done = bot.router.route_at(&ann("Friday"), today()).await.unwrap();

    assert!(done.body().is_some_and(|text| text.contains("#1")));
    let user = bot.store.get_user(UserId(10), CHAT).await.unwrap();
    assert_eq!(user.growth, 0);
    assert!(bot.gateway.deleted().is_empty());

    let entries = bot.store.homework_by_chat(CHAT).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].subject, "/grow");
    assert_eq!(entries[0].task, "/top");
    assert_eq!(entries[0].deadline, "Friday");
    assert_eq!(bot.router.services().conversations.len(), 0);
}

#[tokio::test]
async fn test_flow_is_per_member() {
    let bot = TestBot::with_dice(|dice| dice.rolls([5]).chances([true, false]));

    bot.router
        .route_at(&inbound(CHAT, 10, Some("ann"), "/add_homework"), today())
        .await
        .unwrap();
    bot.router
        .route_at(&inbound(CHAT, 20, Some("bob"), "/grow"), today())
        .await
        .unwrap();

    assert_eq!(bot.store.get_user(UserId(20), CHAT).await.unwrap().growth, 5);
    assert!(bot
        .router
        .services()
        .conversations
        .active((CHAT, UserId(10)), today())
        .is_some());
}

#[tokio::test]
async fn test_cancel_ends_flow_once() {
    let bot = TestBot::new();
    let ann = |text: &str| inbound(CHAT, 10, Some("ann"), text);

    bot.router.route_at(&ann("/add_homework"), today()).await.unwrap();
    bot.router.route_at(&ann("Math"), today()).await.unwrap();

    let cancelled = bot.router.route_at(&ann("/cancel"), today()).await.unwrap();
    assert_eq!(cancelled.body(), Some(t!("homework.cancelled").as_ref()));
    assert_eq!(bot.router.services().conversations.len(), 0);

    let again = bot.router.route_at(&ann("/cancel@keeper_bot"), today()).await.unwrap();
    assert!(again.is_no_op());
    assert!(bot.store.homework_by_chat(CHAT).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_idle_flow_stops_capturing_input() {
    let bot = TestBot::new();
    let ann = |text: &str| inbound(CHAT, 10, Some("ann"), text);

    bot.router.route_at(&ann("/add_homework"), today()).await.unwrap();
    let later = today() + Duration::minutes(16);
    let directive = bot.router.route_at(&ann("/chat_id"), later).await.unwrap();

    assert_eq!(
        directive.body(),
        Some(t!("info.chat_id", chat_id = CHAT).as_ref())
    );
    assert_eq!(bot.router.services().conversations.len(), 0);
}

#[tokio::test]
async fn test_knockout_updates_both_records() {
    let bot = TestBot::with_dice(|dice| dice.rolls([30]));
    bot.router.route(&inbound(CHAT, 20, Some("Bob"), "hello")).await.unwrap();
    let mut bob = bot.store.get_user(UserId(20), CHAT).await.unwrap();
    bob.health = 25;
    bot.store.save_user(&bob).await.unwrap();

    let directive = bot
        .router
        .route(&inbound(CHAT, 10, Some("ann"), "/duel @bob"))
        .await
        .unwrap();

    assert!(directive.body().is_some_and(|text| text.contains("@Bob")));
    let bob = bot.store.get_user(UserId(20), CHAT).await.unwrap();
    assert_eq!(bob.health, 100);

    let ann_stats = bot.store.get_stats(UserId(10), CHAT).await.unwrap().counters;
    let bob_stats = bot.store.get_stats(UserId(20), CHAT).await.unwrap().counters;
    assert_eq!((ann_stats.duels, ann_stats.duels_won, ann_stats.kills), (1, 1, 1));
    assert_eq!((bob_stats.duels, bob_stats.duels_lost, bob_stats.deaths), (1, 1, 1));
    assert_eq!((ann_stats.duels_lost, ann_stats.deaths), (0, 0));
    assert_eq!((bob_stats.duels_won, bob_stats.kills), (0, 0));
}

#[tokio::test]
async fn test_duel_rejects_self_and_strangers() {
    let bot = TestBot::new();

    let own = bot.router.route(&inbound(CHAT, 10, Some("ann"), "/duel @ANN")).await.unwrap();
    assert_eq!(own.body(), Some(t!("duel.self").as_ref()));

    let stranger = bot.router.route(&inbound(CHAT, 10, Some("ann"), "/duel @ghost")).await.unwrap();
    assert_eq!(
        stranger.body(),
        Some(t!("duel.target_not_found", handle = "ghost").as_ref())
    );

    let usage = bot.router.route(&inbound(CHAT, 10, Some("ann"), "/duel")).await.unwrap();
    assert_eq!(usage.body(), Some(t!("duel.usage").as_ref()));
}

#[tokio::test]
async fn test_seeded_growth_keeps_attempts_and_recovers() {
    let mut config = AppConfig::new_test_config();
    config.growth.max_daily_attempts = 2;
    let bot = TestBot::build(config, Arc::new(RandomDice::seeded(2024)));

    for user_id in 10..40u64 {
        set_growth(&bot, user_id, 20 - user_id as i64).await;
    }

    let mut now = today();
    for _day in 0..5 {
        for user_id in 10..40u64 {
            for _ in 0..3 {
                let before = bot.store.get_user(UserId(user_id), CHAT).await.unwrap();
                bot.router
                    .route_at(&inbound(CHAT, user_id, None, "/grow"), now)
                    .await
                    .unwrap();
                let after = bot.store.get_user(UserId(user_id), CHAT).await.unwrap();

                assert!(after.attempts_left <= after.max_attempts);
                let played = after.changed_at == now
                    && (before.changed_at != now || after.attempts_left != before.attempts_left);
                if played {
                    assert!(after.growth > 0, "{} -> {}", before.growth, after.growth);
                }
            }
        }
        now += Duration::days(1);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_plays_spend_quota_once() {
    let bot = Arc::new(TestBot::new());

    let plays: Vec<_> = (0..8)
        .map(|_| {
            let bot = Arc::clone(&bot);
            tokio::spawn(async move {
                bot.router
                    .route_at(&inbound(CHAT, 10, Some("ann"), "/grow"), today())
                    .await
            })
        })
        .collect();

    let mut rejected = 0;
    for play in plays {
        let directive = play.await.unwrap().unwrap();
        if directive.body() == Some(t!("growth.already_played", name = "@ann").as_ref()) {
            rejected += 1;
        }
    }

    assert_eq!(rejected, 7);
    let stats = bot.store.get_stats(UserId(10), CHAT).await.unwrap().counters;
    assert_eq!(stats.messages, 8);
    assert_eq!(stats.growth_up + stats.growth_down, 1);
}

#[tokio::test]
async fn test_schedule_uses_bound_calendar() {
    let bot = TestBot::new();

    let missing = bot.router.route(&inbound(CHAT, 10, Some("ann"), "/schedule")).await.unwrap();
    assert_eq!(missing.body(), Some(t!("calendar.missing").as_ref()));

    bot.store.set_calendar_id(CHAT, "team-calendar").await.unwrap();
    let schedule = bot.router.route(&inbound(CHAT, 10, Some("ann"), "/schedule")).await.unwrap();
    assert_eq!(schedule.parse_mode, Some(ParseMode::MarkdownV2));
    assert_eq!(schedule.body(), Some("*Today*"));
    assert_eq!(bot.fetcher.schedule_requests(), vec!["team-calendar"]);

    bot.fetcher.fail(true);
    let failed = bot.router.route(&inbound(CHAT, 10, Some("ann"), "/schedule")).await.unwrap();
    assert_eq!(
        failed.body(),
        Some(t!("calendar.fetch_failed", calendar_id = "team-calendar").as_ref())
    );
}

#[tokio::test]
async fn test_content_commands() {
    let bot = TestBot::new();

    let joke = bot.router.route(&inbound(CHAT, 10, Some("ann"), "/joke")).await.unwrap();
    assert_eq!(joke.body(), Some("There are 10 kinds of people."));

    let comic = bot.router.route(&inbound(CHAT, 10, Some("ann"), "/xkcd")).await.unwrap();
    assert!(matches!(
        comic.method,
        DeliveryMethod::SendPhoto { ref url, .. } if url == "https://imgs.xkcd.com/comics/python.png"
    ));

    bot.fetcher.fail(true);
    let failed = bot.router.process(&inbound(CHAT, 10, Some("ann"), "/joke")).await;
    assert_eq!(failed.body(), Some(t!("errors.generic").as_ref()));
}

#[tokio::test]
async fn test_flip_falls_back_to_text() {
    let bot = TestBot::new();
    let text = bot.router.route(&inbound(CHAT, 10, Some("ann"), "/flip")).await.unwrap();
    assert!(matches!(text.method, DeliveryMethod::SendText(_)));

    let mut config = AppConfig::new_test_config();
    config.content.flip_heads_url = Some("https://example.com/heads.png".into());
    config.content.flip_tails_url = Some("https://example.com/tails.png".into());
    let bot = TestBot::with_config(config, |dice| dice.chances([true]));

    let photo = bot.router.route(&inbound(CHAT, 10, Some("ann"), "/flip")).await.unwrap();
    assert!(matches!(
        photo.method,
        DeliveryMethod::SendPhoto { ref url, .. } if url == "https://example.com/heads.png"
    ));
}

#[tokio::test]
async fn test_ask_counts_votes() {
    let bot = TestBot::with_dice(|dice| dice.chances([true, false, false]));
    for _ in 0..3 {
        bot.router
            .route(&inbound(CHAT, 10, Some("ann"), "/ask will it rain?"))
            .await
            .unwrap();
    }

    let counters = bot.store.get_stats(UserId(10), CHAT).await.unwrap().counters;
    assert_eq!((counters.yes_votes, counters.no_votes), (1, 2));

    let usage = bot.router.route(&inbound(CHAT, 10, Some("ann"), "/ask")).await.unwrap();
    assert_eq!(usage.body(), Some(t!("fun.ask_usage").as_ref()));
}

#[tokio::test]
async fn test_homework_listing_and_deletion() {
    let bot = TestBot::new();
    let ann = |text: &str| inbound(CHAT, 10, Some("ann"), text);
    for step in ["/add_homework", "Math", "p. 12", "Monday", "/add_homework", "History", "essay", "Friday"] {
        bot.router.route_at(&ann(step), today()).await.unwrap();
    }

    let all = bot.router.route(&ann("/homework")).await.unwrap();
    assert!(all.body().is_some_and(|text| text.contains("Math") && text.contains("History")));

    let math = bot.router.route(&ann("/homework math")).await.unwrap();
    assert!(math.body().is_some_and(|text| text.contains("Math") && !text.contains("History")));

    let invalid = bot.router.route(&ann("/delete_homework first")).await.unwrap();
    assert_eq!(invalid.body(), Some(t!("homework.invalid_id").as_ref()));

    let deleted = bot.router.route(&ann("/delete_homework 1")).await.unwrap();
    assert_eq!(deleted.body(), Some(t!("homework.deleted", id = 1).as_ref()));
    let missing = bot.router.route(&ann("/delete_homework 1")).await.unwrap();
    assert_eq!(missing.body(), Some(t!("homework.not_found", id = 1).as_ref()));
}

#[tokio::test]
async fn test_stats_and_leaderboard() {
    let bot = TestBot::new();
    for user_id in [20, 30] {
        bot.router.route(&inbound(CHAT, user_id, None, "hi")).await.unwrap();
    }
    set_growth(&bot, 10, 12).await;
    set_growth(&bot, 20, 40).await;
    set_growth(&bot, 30, -5).await;

    let top = bot.router.route(&inbound(CHAT, 10, Some("ann"), "/top")).await.unwrap();
    assert_eq!(top.parse_mode, Some(ParseMode::MarkdownV2));
    let text = top.body().unwrap_or_default();
    assert!(text.contains("1\\. User 20: 40"));
    assert!(text.contains("2\\. ann: 12"));
    assert!(!text.contains("-5"));

    let mine = bot.router.route(&inbound(CHAT, 10, Some("ann"), "/my_stats")).await.unwrap();
    assert!(mine.reply_to.is_some());
    let chat = bot.router.route(&inbound(CHAT, 10, Some("ann"), "/chat_stats")).await.unwrap();
    assert!(chat.body().is_some_and(|text| text.contains(&t!(
        "stats.counters",
        messages = 5,
        growth_up = 0,
        growth_down = 0,
        yes_votes = 0,
        no_votes = 0,
        duels = 0,
        duels_won = 0,
        duels_lost = 0,
        kills = 0,
        deaths = 0
    )
    .to_string())));
}

#[tokio::test]
async fn test_call_all_mentions_admins() {
    let bot = TestBot::new();
    bot.gateway.add_admin(
        CHAT,
        ChatMember {
            id: UserId(99),
            username: Some("boss".into()),
            first_name: "Boss".into(),
        },
    );
    bot.gateway.add_admin(
        CHAT,
        ChatMember {
            id: UserId(98),
            username: None,
            first_name: "Deputy".into(),
        },
    );

    let directive = bot.router.route(&inbound(CHAT, 10, Some("ann"), "/all")).await.unwrap();

    let text = directive.body().unwrap_or_default();
    assert!(text.contains("@boss"));
    assert!(text.contains("tg://user?id=98"));

    bot.gateway.fail_roster(true);
    let nobody = bot.router.route(&inbound(CHAT, 10, Some("ann"), "/all")).await.unwrap();
    assert_eq!(nobody.body(), Some(t!("fun.nobody_to_call").as_ref()));
}

#[tokio::test]
async fn test_stats_outage_does_not_block_commands() {
    let bot = TestBot::with_stats_outage(|dice| dice.rolls([5, 20]).chances([true, false]));
    bot.router.route(&inbound(CHAT, 20, Some("bob"), "hi")).await.unwrap();

    let grow = bot
        .router
        .route_at(&inbound(CHAT, 10, Some("ann"), "/grow"), today())
        .await
        .unwrap();
    assert_eq!(
        grow.body(),
        Some(t!("growth.welcome", name = "@ann", value = 5).as_ref())
    );
    assert_eq!(bot.store.get_user(UserId(10), CHAT).await.unwrap().growth, 5);

    let duel = bot
        .router
        .route(&inbound(CHAT, 10, Some("ann"), "/duel @bob"))
        .await
        .unwrap();
    assert_eq!(
        duel.body(),
        Some(t!("duel.hit", attacker = "@ann", defender = "@bob", damage = 20, health = 80).as_ref())
    );
    assert_eq!(bot.store.get_user(UserId(20), CHAT).await.unwrap().health, 80);

    let mine = bot.router.route(&inbound(CHAT, 10, Some("ann"), "/my_stats")).await.unwrap();
    assert!(!mine.is_no_op());
    assert_eq!(bot.store.get_stats(UserId(10), CHAT).await.unwrap().counters.messages, 0);
}

#[tokio::test]
async fn test_call_all_escapes_admin_names() {
    let bot = TestBot::new();
    bot.gateway.add_admin(
        CHAT,
        ChatMember {
            id: UserId(98),
            username: None,
            first_name: "Dr. Who-Knows!".into(),
        },
    );

    let directive = bot.router.route(&inbound(CHAT, 10, Some("ann"), "/all")).await.unwrap();

    assert_eq!(directive.parse_mode, Some(ParseMode::MarkdownV2));
    assert_eq!(directive.body(), Some("[Dr\\. Who\\-Knows\\!](tg://user?id=98)"));
}

#[tokio::test]
async fn test_flow_prompts_reply_to_their_trigger() {
    let bot = TestBot::new();
    let ann = |text: &str| inbound(CHAT, 10, Some("ann"), text);

    let start = ann("/add_homework");
    let prompt = bot.router.route_at(&start, today()).await.unwrap();
    assert_eq!(prompt.reply_to, Some(start.message_id));

    let subject = ann("Math");
    let next = bot.router.route_at(&subject, today()).await.unwrap();
    assert_eq!(next.reply_to, Some(subject.message_id));

    let cancel = ann("/cancel");
    let cancelled = bot.router.route_at(&cancel, today()).await.unwrap();
    assert_eq!(cancelled.reply_to, Some(cancel.message_id));
}
