// Tests for the champ select poll loop

use super::super::{AutomationConfig, ChampionTarget, TickOutcome};
use super::test_helpers::*;
use crate::commands::lcu_communication::{
  HttpMethod, ALL_GRID_CHAMPIONS, CHAMP_SELECT_SESSION, READY_CHECK, READY_CHECK_ACCEPT,
};
use serde_json::json;
use std::thread;
use std::time::Duration;

const ROSTER: &[(&str, i64)] = &[("Zed", 238), ("Ahri", 103), ("Lux", 99)];

#[cfg(test)]
mod monitor_tests {
  use super::*;

  /// Scenario: local seat 3 owns pick action 7 which is in progress.
  /// Expected: one PATCH completing action 7 with Zed's id.
  #[test]
  fn test_instalock_end_to_end() {
    let f = fixture(&[("Zed", 238)]);
    assert!(f.automation.set_instalock_target("zed"));
    f.serve_session(session(Some(3), vec![vec![action(7, 3, "pick", true, false)]]));

    assert_eq!(f.monitor.tick(), TickOutcome::Scanned);

    let patches = f.mock.patches();
    assert_eq!(patches.len(), 1);
    assert_eq!(patches[0].path, action_path(7));
    assert_eq!(
      patches[0].body,
      Some(json!({ "completed": true, "championId": 238 }))
    );
    assert_eq!(f.monitor.last_handled_action_id(), Some(7));
  }

  /// The client keeps reporting the action as open for a moment after the patch.
  #[test]
  fn test_at_most_one_patch_per_action() {
    let f = fixture(ROSTER);
    assert!(f.automation.set_instalock_target("ahri"));
    f.mock.reply_json(HttpMethod::Patch, &action_path(7), 204, json!(null));
    f.serve_session(session(Some(3), vec![vec![action(7, 3, "pick", true, false)]]));

    f.monitor.tick();
    f.monitor.tick();
    f.monitor.tick();

    assert_eq!(f.mock.patches().len(), 1);
    assert_eq!(f.monitor.last_handled_action_id(), Some(7));
  }

  #[test]
  fn test_rejected_patch_is_retried_next_tick() {
    let f = fixture(ROSTER);
    assert!(f.automation.set_instalock_target("zed"));
    f.mock.reply_json(HttpMethod::Patch, &action_path(7), 500, json!({"message": "busy"}));
    f.mock.reply_json(HttpMethod::Patch, &action_path(7), 204, json!(null));
    f.serve_session(session(Some(3), vec![vec![action(7, 3, "pick", true, false)]]));

    f.monitor.tick();
    assert_eq!(f.monitor.last_handled_action_id(), None);
    f.monitor.tick();
    assert_eq!(f.monitor.last_handled_action_id(), Some(7));
    f.monitor.tick();

    assert_eq!(f.mock.patches().len(), 2);
  }

  #[test]
  fn test_patch_transport_error_is_retried() {
    let f = fixture(ROSTER);
    assert!(f.automation.set_instalock_target("zed"));
    f.mock.reply(HttpMethod::Patch, &action_path(7), MockReply::TransportError);
    f.mock.reply_json(HttpMethod::Patch, &action_path(7), 200, json!({}));
    f.serve_session(session(Some(3), vec![vec![action(7, 3, "pick", true, false)]]));

    assert_eq!(f.monitor.tick(), TickOutcome::Scanned);
    assert_eq!(f.monitor.last_handled_action_id(), None);
    assert_eq!(f.monitor.tick(), TickOutcome::Scanned);
    assert_eq!(f.monitor.last_handled_action_id(), Some(7));
  }

  #[test]
  fn test_auto_ban_dispatch() {
    let f = fixture(ROSTER);
    assert!(f.automation.set_auto_ban_target("lux"));
    f.serve_session(session(
      Some(0),
      vec![
        vec![action(1, 0, "ban", true, false), action(2, 5, "ban", true, false)],
        vec![action(3, 0, "pick", false, false)],
      ],
    ));

    f.monitor.tick();

    let patches = f.mock.patches();
    assert_eq!(patches.len(), 1);
    assert_eq!(patches[0].path, action_path(1));
    assert_eq!(patches[0].body, Some(json!({ "completed": true, "championId": 99 })));
    assert_eq!(f.monitor.last_handled_action_id(), Some(1));
  }

  #[test]
  fn test_pick_and_ban_use_their_own_targets() {
    let f = fixture(ROSTER);
    assert!(f.automation.set_instalock_target("zed"));
    assert!(f.automation.set_auto_ban_target("ahri"));
    f.serve_session(session(Some(1), vec![vec![action(4, 1, "ban", true, false)]]));
    f.monitor.tick();
    f.serve_session(session(
      Some(1),
      vec![
        vec![action(4, 1, "ban", false, true)],
        vec![action(9, 1, "pick", true, false)],
      ],
    ));
    f.monitor.tick();

    let bodies: Vec<_> = f.mock.patches().into_iter().map(|p| (p.path, p.body)).collect();
    assert_eq!(
      bodies,
      vec![
        (action_path(4), Some(json!({ "completed": true, "championId": 103 }))),
        (action_path(9), Some(json!({ "completed": true, "championId": 238 }))),
      ]
    );
  }

  #[test]
  fn test_ignores_actions_not_ready_for_us() {
    let f = fixture(ROSTER);
    assert!(f.automation.set_instalock_target("zed"));
    f.serve_session(session(
      Some(2),
      vec![vec![
        action(1, 4, "pick", true, false),   // other seat
        action(2, 2, "pick", false, false),  // not our turn yet
        action(3, 2, "pick", true, true),    // already completed
        action(4, 2, "ten_bans_reveal", true, false),
      ]],
    ));

    assert_eq!(f.monitor.tick(), TickOutcome::Scanned);
    assert!(f.mock.patches().is_empty());
  }

  #[test]
  fn test_disabled_automation_does_nothing() {
    let f = fixture(ROSTER);
    assert!(f.automation.set_instalock_target("zed"));
    assert!(!f.automation.toggle_instalock());
    f.serve_session(session(Some(3), vec![vec![action(7, 3, "pick", true, false)]]));

    f.monitor.tick();
    assert!(f.mock.patches().is_empty());

    // Re-enabling is picked up on the next tick
    assert!(f.automation.toggle_instalock());
    f.monitor.tick();
    assert_eq!(f.mock.patches().len(), 1);
  }

  /// Every random pick lands on a loaded champion.
  #[test]
  fn test_random_instalock_uses_loaded_ids() {
    let f = fixture(ROSTER);
    assert!(f.automation.set_instalock_target("random"));
    let ids: Vec<i64> = ROSTER.iter().map(|(_, id)| *id).collect();

    for action_id in 1..=20 {
      f.serve_session(session(Some(0), vec![vec![action(action_id, 0, "pick", true, false)]]));
      f.monitor.tick();
      assert_eq!(f.monitor.last_handled_action_id(), Some(action_id));
    }

    let patches = f.mock.patches();
    assert_eq!(patches.len(), 20);
    for patch in patches {
      let champion_id = patch.body.unwrap()["championId"].as_i64().unwrap();
      assert_ne!(champion_id, -1);
      assert!(ids.contains(&champion_id));
    }
  }

  #[test]
  fn test_leaving_champ_select_resets_last_action() {
    let f = fixture(ROSTER);
    assert!(f.automation.set_instalock_target("zed"));
    f.serve_session(session(Some(3), vec![vec![action(7, 3, "pick", true, false)]]));
    f.monitor.tick();
    assert_eq!(f.monitor.last_handled_action_id(), Some(7));

    f.mock.set_json(
      HttpMethod::Get,
      CHAMP_SELECT_SESSION,
      404,
      json!({"errorCode": "RPC_ERROR", "httpStatus": 404}),
    );
    assert_eq!(f.monitor.tick(), TickOutcome::Idle);
    assert_eq!(f.monitor.last_handled_action_id(), None);
  }

  #[test]
  fn test_rpc_error_body_counts_as_idle() {
    let f = fixture(ROSTER);
    f.mock.set_json(
      HttpMethod::Get,
      CHAMP_SELECT_SESSION,
      200,
      json!({"errorCode": "RPC_ERROR", "message": "Not in champ select"}),
    );
    assert_eq!(f.monitor.tick(), TickOutcome::Idle);
  }

  #[test]
  fn test_waits_for_local_seat() {
    let f = fixture(ROSTER);
    assert!(f.automation.set_instalock_target("zed"));
    f.serve_session(session(None, vec![vec![action(7, 3, "pick", true, false)]]));
    assert_eq!(f.monitor.tick(), TickOutcome::AwaitingSeat);
    assert!(f.mock.patches().is_empty());
  }

  #[test]
  fn test_poll_failures_are_contained() {
    let f = fixture(ROSTER);
    assert!(f.automation.set_instalock_target("zed"));
    f.serve_session(session(Some(3), vec![vec![action(7, 3, "pick", true, false)]]));
    f.monitor.tick();
    assert_eq!(f.monitor.last_handled_action_id(), Some(7));

    f.mock.set_reply(HttpMethod::Get, CHAMP_SELECT_SESSION, MockReply::TransportError);
    assert_eq!(f.monitor.tick(), TickOutcome::Error);

    f.mock.set_reply(
      HttpMethod::Get,
      CHAMP_SELECT_SESSION,
      MockReply::Respond(200, "{\"localPlayerCellId\": \"three\"".into()),
    );
    assert_eq!(f.monitor.tick(), TickOutcome::Error);

    // Errors do not forget the handled action
    assert_eq!(f.monitor.last_handled_action_id(), Some(7));
  }

  /// A saved target cannot be dispatched while the roster is unavailable.
  #[test]
  fn test_unloaded_directory_skips_dispatch() {
    let config = AutomationConfig {
      instalock_enabled: true,
      instalock_champion: ChampionTarget::Named("zed".into()),
      ..AutomationConfig::default()
    };
    let f = fixture_with_config(&[], config);
    f.serve_session(session(Some(3), vec![vec![action(7, 3, "pick", true, false)]]));

    assert_eq!(f.monitor.tick(), TickOutcome::Scanned);
    assert!(f.mock.patches().is_empty());
    assert!(!f.mock.requests_to(HttpMethod::Get, ALL_GRID_CHAMPIONS).is_empty());

    // Roster shows up once the client is ready
    f.mock.reply_json(HttpMethod::Get, ALL_GRID_CHAMPIONS, 200, roster(&[("Zed", 238)]));
    f.monitor.tick();
    assert_eq!(f.mock.patches().len(), 1);
    assert_eq!(f.monitor.last_handled_action_id(), Some(7));
  }

  #[test]
  fn test_auto_accept_accepts_pending_ready_check() {
    let f = fixture(ROSTER);
    assert!(f.automation.toggle_auto_accept());
    f.mock.reply_json(
      HttpMethod::Get,
      READY_CHECK,
      200,
      json!({"state": "InProgress", "playerResponse": "None", "timer": 3.0}),
    );
    f.mock.reply_json(HttpMethod::Post, READY_CHECK_ACCEPT, 204, json!(null));

    assert_eq!(f.monitor.tick(), TickOutcome::Idle);
    assert_eq!(f.mock.requests_to(HttpMethod::Post, READY_CHECK_ACCEPT).len(), 1);
  }

  #[test]
  fn test_auto_accept_leaves_answered_ready_check() {
    let f = fixture(ROSTER);
    assert!(f.automation.toggle_auto_accept());
    f.mock.reply_json(
      HttpMethod::Get,
      READY_CHECK,
      200,
      json!({"state": "InProgress", "playerResponse": "Accepted"}),
    );
    f.monitor.tick();
    assert!(f.mock.requests_to(HttpMethod::Post, READY_CHECK_ACCEPT).is_empty());

    assert!(!f.automation.toggle_auto_accept());
    f.mock.set_json(
      HttpMethod::Get,
      READY_CHECK,
      200,
      json!({"state": "InProgress", "playerResponse": "None"}),
    );
    f.monitor.tick();
    assert!(f.mock.requests_to(HttpMethod::Post, READY_CHECK_ACCEPT).is_empty());
  }

  #[test]
  fn test_start_is_idempotent_and_stop_ends_worker() {
    let f = fixture(ROSTER);
    assert!(f.monitor.start());
    assert!(!f.monitor.start());
    assert!(f.monitor.is_running());

    thread::sleep(Duration::from_millis(30));
    assert!(!f.mock.requests_to(HttpMethod::Get, CHAMP_SELECT_SESSION).is_empty());

    f.monitor.stop_and_join();
    assert!(!f.monitor.is_running());

    assert!(f.monitor.start());
    f.monitor.stop();
    assert!(!f.monitor.is_running());
    f.monitor.stop_and_join();
  }

  /// The background worker completes the action on its own.
  #[test]
  fn test_worker_dispatches_in_background() {
    let f = fixture(&[("Zed", 238)]);
    assert!(f.automation.set_instalock_target("zed"));
    f.serve_session(session(Some(3), vec![vec![action(7, 3, "pick", true, false)]]));
    assert!(f.monitor.start());

    let mut waited = 0;
    while f.monitor.last_handled_action_id().is_none() && waited < 200 {
      thread::sleep(Duration::from_millis(10));
      waited += 1;
    }
    f.monitor.stop_and_join();

    assert_eq!(f.monitor.last_handled_action_id(), Some(7));
    assert_eq!(f.mock.patches().len(), 1);
  }

  /// Scenario: a saved config carries "Random" as the ban target.
  /// Expected: ban actions are left alone; random only applies to picks.
  #[test]
  fn test_random_ban_target_never_dispatches() {
    let config = AutomationConfig {
      auto_ban_enabled: true,
      auto_ban_champion: ChampionTarget::Random,
      ..AutomationConfig::default()
    };
    let f = fixture_with_config(ROSTER, config);
    f.serve_session(session(Some(3), vec![vec![action(1, 3, "ban", true, false)]]));

    assert_eq!(f.monitor.tick(), TickOutcome::Scanned);
    f.monitor.tick();

    assert!(f.mock.patches().is_empty());
    assert_eq!(f.monitor.last_handled_action_id(), None);
  }

  /// Scenario: the client has no roster yet while an instalock target is saved.
  /// Expected: each tick asks for the roster once, not once per lookup.
  #[test]
  fn test_missing_roster_fetched_once_per_tick() {
    let config = AutomationConfig {
      instalock_enabled: true,
      instalock_champion: ChampionTarget::Named("zed".into()),
      ..AutomationConfig::default()
    };
    let f = fixture_with_config(&[], config);
    f.serve_session(session(Some(3), vec![vec![action(7, 3, "pick", true, false)]]));

    f.monitor.tick();
    assert_eq!(f.mock.requests_to(HttpMethod::Get, ALL_GRID_CHAMPIONS).len(), 1);
    f.monitor.tick();
    assert_eq!(f.mock.requests_to(HttpMethod::Get, ALL_GRID_CHAMPIONS).len(), 2);
    assert!(f.mock.patches().is_empty());
  }

  /// Scenario: stop() then start() while the first worker may still be mid-tick.
  /// Expected: once start() returns, only the new worker talks to the client.
  #[test]
  fn test_restart_waits_for_stopped_worker() {
    let f = fixture(ROSTER);
    assert!(f.monitor.start());
    assert!(wait_until(|| !f.mock.requests().is_empty()));
    let first_worker = f.mock.requests()[0].thread;

    f.monitor.stop();
    assert!(f.monitor.start());
    let seen = f.mock.requests().len();
    assert!(wait_until(|| f.mock.requests().len() > seen + 3));
    f.monitor.stop_and_join();

    let later = f.mock.requests().split_off(seen);
    assert!(later.iter().all(|r| r.thread != first_worker));
    assert!(later.iter().all(|r| r.thread == later[0].thread));
  }
}
