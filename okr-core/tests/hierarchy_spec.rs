use speculate2::speculate;

mod support;

speculate! {
    use std::time::Duration;

    use crate::support::{FailingStore, INJECTED_FAILURE};
    use okr_core::models::*;
    use okr_core::{cascade, hierarchy, lifecycle, progress};
    use okr_core::{Database, Error, HierarchyStore, InMemoryStore, RecordKind};
    use uuid::Uuid;

    fn objective_input(title: &str) -> ObjectiveInput {
        ObjectiveInput {
            title: title.into(),
            owner: "ana".into(),
            ..Default::default()
        }
    }

    fn metric(title: &str, current: f64) -> KeyResultInput {
        KeyResultInput {
            title: title.into(),
            current_value: Some(current),
            ..Default::default()
        }
    }

    fn initiative(title: &str) -> InitiativeInput {
        InitiativeInput {
            title: title.into(),
            ..Default::default()
        }
    }

    describe "record lifecycle" {
        before {
            let store = InMemoryStore::new();
            let objective = lifecycle::create_objective(&store, objective_input("Grow revenue")).unwrap();
            let objective_id = objective.objective.id;
        }

        it "creates objectives as active with zero progress" {
            assert_eq!(objective.objective.status, ObjectiveStatus::Active);
            assert_eq!(objective.progress, 0.0);
            assert!(store.find_objective(objective_id).unwrap().is_some());
        }

        it "rejects an objective without a title" {
            let err = lifecycle::create_objective(&store, objective_input("  ")).unwrap_err();
            assert!(matches!(err, Error::Validation(_)));
        }

        it "applies key result defaults" {
            let kr = lifecycle::create_key_result(&store, objective_id, KeyResultInput {
                title: "Signups".into(),
                ..Default::default()
            }).unwrap();
            assert_eq!(kr.key_result.result_type, KeyResultType::Metric);
            assert_eq!(kr.key_result.start_value, 0.0);
            assert_eq!(kr.key_result.target_value, 100.0);
            assert_eq!(kr.key_result.current_value, 0.0);
            assert_eq!(kr.key_result.objective_id, objective_id);
            assert!(kr.initiatives.is_empty());
        }

        it "refuses a key result under a missing objective" {
            let err = lifecycle::create_key_result(&store, Uuid::new_v4(), metric("x", 0.0)).unwrap_err();
            assert!(matches!(err, Error::Validation(_)));
        }

        it "refuses an initiative under a missing key result" {
            let err = lifecycle::create_initiative(&store, Uuid::new_v4(), initiative("x")).unwrap_err();
            assert!(matches!(err, Error::Validation(_)));
        }

        it "updates progress without touching other fields" {
            let kr = lifecycle::create_key_result(&store, objective_id, KeyResultInput {
                title: "Deals".into(),
                owner: "bo".into(),
                result_type: Some(KeyResultType::Metric),
                ..Default::default()
            }).unwrap().key_result;

            std::thread::sleep(Duration::from_millis(2));
            let updated = lifecycle::update_key_result_progress(&store, kr.id, 40.0).unwrap();

            assert_eq!(updated.key_result.current_value, 40.0);
            assert_eq!(updated.progress, 40.0);
            assert_eq!(updated.key_result.title, "Deals");
            assert_eq!(updated.key_result.owner, "bo");
            assert_eq!(updated.key_result.result_type, KeyResultType::Metric);
            assert!(updated.key_result.updated_at > kr.updated_at);
            assert_eq!(updated.key_result.created_at, kr.created_at);
        }

        it "keeps a caller-supplied id" {
            let id = Uuid::new_v4();
            let created = lifecycle::create_objective(&store, ObjectiveInput {
                id: Some(id),
                ..objective_input("Chosen id")
            }).unwrap();
            assert_eq!(created.objective.id, id);
            assert_eq!(store.find_objective(id).unwrap().unwrap().title, "Chosen id");

            let kr_id = Uuid::new_v4();
            let kr = lifecycle::create_key_result(&store, id, KeyResultInput {
                id: Some(kr_id),
                ..metric("k", 0.0)
            }).unwrap();
            assert_eq!(kr.key_result.id, kr_id);

            let init_id = Uuid::new_v4();
            let init = lifecycle::create_initiative(&store, kr_id, InitiativeInput {
                id: Some(init_id),
                ..initiative("i")
            }).unwrap();
            assert_eq!(init.id, init_id);
        }

        it "rejects an id that is already in use" {
            let err = lifecycle::create_objective(&store, ObjectiveInput {
                id: Some(objective_id),
                ..objective_input("Duplicate")
            }).unwrap_err();
            assert!(matches!(err, Error::Validation(_)));
            assert_eq!(store.list_objectives().unwrap().len(), 1);
            assert_eq!(store.find_objective(objective_id).unwrap().unwrap().title, "Grow revenue");

            let kr = lifecycle::create_key_result(&store, objective_id, metric("k", 0.0)).unwrap().key_result;
            let err = lifecycle::create_key_result(&store, objective_id, KeyResultInput {
                id: Some(kr.id),
                ..metric("again", 0.0)
            }).unwrap_err();
            assert!(matches!(err, Error::Validation(_)));
            assert_eq!(store.count_key_results_by_objective(objective_id).unwrap(), 1);
        }

        it "reports a progress update on a missing key result as not found" {
            let err = lifecycle::update_key_result_progress(&store, Uuid::new_v4(), 1.0).unwrap_err();
            assert!(matches!(err, Error::NotFound { kind: RecordKind::KeyResult, .. }));
        }

        it "replaces an objective and keeps its identity" {
            let detail = lifecycle::replace_objective(&store, objective_id, ObjectiveInput {
                title: "Grow profit".into(),
                status: Some(ObjectiveStatus::Paused),
                ..Default::default()
            }).unwrap();
            assert_eq!(detail.objective.id, objective_id);
            assert_eq!(detail.objective.title, "Grow profit");
            assert_eq!(detail.objective.status, ObjectiveStatus::Paused);
            assert_eq!(detail.objective.created_at, objective.objective.created_at);
        }

        it "replaces a key result but keeps its objective link" {
            let kr = lifecycle::create_key_result(&store, objective_id, metric("a", 10.0)).unwrap().key_result;
            let replaced = lifecycle::replace_key_result(&store, kr.id, KeyResultInput {
                title: "Launch".into(),
                result_type: Some(KeyResultType::Binary),
                target_value: Some(1.0),
                current_value: Some(1.0),
                ..Default::default()
            }).unwrap();
            assert_eq!(replaced.key_result.objective_id, objective_id);
            assert_eq!(replaced.progress, 100.0);
        }

        it "replaces an initiative and keeps its key result link" {
            let kr = lifecycle::create_key_result(&store, objective_id, metric("a", 0.0)).unwrap().key_result;
            let init = lifecycle::create_initiative(&store, kr.id, initiative("Draft plan")).unwrap();
            assert_eq!(init.status, InitiativeStatus::NotStarted);

            let replaced = lifecycle::replace_initiative(&store, init.id, InitiativeInput {
                title: "Run plan".into(),
                status: Some(InitiativeStatus::InProgress),
                ..Default::default()
            }).unwrap();
            assert_eq!(replaced.id, init.id);
            assert_eq!(replaced.key_result_id, kr.id);
            assert_eq!(replaced.status, InitiativeStatus::InProgress);
        }

        it "reports replaces of missing records as not found" {
            let err = lifecycle::replace_objective(&store, Uuid::new_v4(), objective_input("x")).unwrap_err();
            assert!(matches!(err, Error::NotFound { kind: RecordKind::Objective, .. }));
            let err = lifecycle::replace_initiative(&store, Uuid::new_v4(), initiative("x")).unwrap_err();
            assert!(matches!(err, Error::NotFound { kind: RecordKind::Initiative, .. }));
        }
    }

    describe "objective progress" {
        before {
            let store = InMemoryStore::new();
            let objective_id = lifecycle::create_objective(&store, objective_input("O")).unwrap().objective.id;
        }

        it "is zero without key results" {
            assert_eq!(progress::objective_progress(&store, objective_id).unwrap(), 0.0);
        }

        it "is the mean of its key results" {
            lifecycle::create_key_result(&store, objective_id, metric("a", 25.0)).unwrap();
            lifecycle::create_key_result(&store, objective_id, metric("b", 75.0)).unwrap();
            assert_eq!(progress::objective_progress(&store, objective_id).unwrap(), 50.0);
        }
    }

    describe "cascading delete" {
        before {
            let store = Database::open_in_memory().unwrap();
            store.migrate().unwrap();

            let objective_id = lifecycle::create_objective(&store, objective_input("O")).unwrap().objective.id;
            let kr_a = lifecycle::create_key_result(&store, objective_id, metric("a", 0.0)).unwrap().key_result.id;
            let kr_b = lifecycle::create_key_result(&store, objective_id, metric("b", 0.0)).unwrap().key_result.id;
            let init_a = lifecycle::create_initiative(&store, kr_a, initiative("ia")).unwrap().id;
            let init_b = lifecycle::create_initiative(&store, kr_b, initiative("ib")).unwrap().id;

            let other_id = lifecycle::create_objective(&store, objective_input("Other")).unwrap().objective.id;
            let other_kr = lifecycle::create_key_result(&store, other_id, metric("c", 0.0)).unwrap().key_result.id;
        }

        it "removes an objective with its whole subtree" {
            cascade::delete_objective(&store, objective_id).unwrap();

            assert!(store.find_objective(objective_id).unwrap().is_none());
            assert!(store.find_key_result(kr_a).unwrap().is_none());
            assert!(store.find_key_result(kr_b).unwrap().is_none());
            assert!(store.find_initiative(init_a).unwrap().is_none());
            assert!(store.find_initiative(init_b).unwrap().is_none());

            let err = hierarchy::objective_detail(&store, objective_id).unwrap_err();
            assert!(matches!(err, Error::NotFound { kind: RecordKind::Objective, .. }));
        }

        it "leaves other objectives alone" {
            cascade::delete_objective(&store, objective_id).unwrap();
            assert!(store.find_objective(other_id).unwrap().is_some());
            assert!(store.find_key_result(other_kr).unwrap().is_some());
        }

        it "removes a key result with its initiatives" {
            cascade::delete_key_result(&store, kr_a).unwrap();
            assert!(store.find_key_result(kr_a).unwrap().is_none());
            assert!(store.find_initiative(init_a).unwrap().is_none());
            assert!(store.find_initiative(init_b).unwrap().is_some());
            assert_eq!(store.count_key_results_by_objective(objective_id).unwrap(), 1);
        }

        it "deletes a key result that has no initiatives" {
            cascade::delete_key_result(&store, other_kr).unwrap();
            assert_eq!(store.count_key_results_by_objective(other_id).unwrap(), 0);
        }

        it "deletes a single initiative" {
            cascade::delete_initiative(&store, init_a).unwrap();
            assert_eq!(store.count_initiatives_by_key_result(kr_a).unwrap(), 0);
        }

        it "signals not found for missing records" {
            assert!(matches!(
                cascade::delete_objective(&store, Uuid::new_v4()).unwrap_err(),
                Error::NotFound { kind: RecordKind::Objective, .. }
            ));
            assert!(matches!(
                cascade::delete_key_result(&store, Uuid::new_v4()).unwrap_err(),
                Error::NotFound { kind: RecordKind::KeyResult, .. }
            ));
            assert!(matches!(
                cascade::delete_initiative(&store, Uuid::new_v4()).unwrap_err(),
                Error::NotFound { kind: RecordKind::Initiative, .. }
            ));
        }

        it "signals not found on a second delete" {
            cascade::delete_objective(&store, objective_id).unwrap();
            assert!(cascade::delete_objective(&store, objective_id).is_err());
        }
    }

    describe "interrupted cascading delete" {
        before {
            let store = FailingStore::failing_key_result_sweep(1);
            let objective_id = lifecycle::create_objective(&store, objective_input("O")).unwrap().objective.id;
            let kr = lifecycle::create_key_result(&store, objective_id, metric("a", 0.0)).unwrap().key_result.id;
            let init = lifecycle::create_initiative(&store, kr, initiative("ia")).unwrap().id;
        }

        it "returns the store error and keeps the deletes already applied" {
            let err = cascade::delete_objective(&store, objective_id).unwrap_err();
            match err {
                Error::Storage(msg) => assert_eq!(msg, INJECTED_FAILURE),
                other => panic!("unexpected error: {other}"),
            }

            assert!(store.find_initiative(init).unwrap().is_none());
            assert!(store.find_key_result(kr).unwrap().is_some());
            assert!(store.find_objective(objective_id).unwrap().is_some());
        }

        it "finishes the job when retried" {
            assert!(cascade::delete_objective(&store, objective_id).is_err());
            cascade::delete_objective(&store, objective_id).unwrap();

            assert!(store.find_objective(objective_id).unwrap().is_none());
            assert!(store.find_key_result(kr).unwrap().is_none());
        }
    }

    describe "objective detail" {
        before {
            let store = InMemoryStore::new();
            let objective_id = lifecycle::create_objective(&store, objective_input("O")).unwrap().objective.id;
            let kr = lifecycle::create_key_result(&store, objective_id, metric("a", 30.0)).unwrap().key_result.id;
            lifecycle::create_key_result(&store, objective_id, KeyResultInput {
                title: "Launch".into(),
                result_type: Some(KeyResultType::Binary),
                target_value: Some(1.0),
                current_value: Some(1.0),
                ..Default::default()
            }).unwrap();
            lifecycle::create_initiative(&store, kr, initiative("one")).unwrap();
            lifecycle::create_initiative(&store, kr, initiative("two")).unwrap();
        }

        it "nests key results with progress and initiatives" {
            let detail = hierarchy::objective_detail(&store, objective_id).unwrap();
            assert_eq!(detail.progress, 65.0);
            assert_eq!(detail.key_results.len(), 2);

            let first = &detail.key_results[0];
            assert_eq!(first.progress, 30.0);
            let titles: Vec<_> = first.initiatives.iter().map(|i| i.title.as_str()).collect();
            assert_eq!(titles, vec!["one", "two"]);

            assert_eq!(detail.key_results[1].progress, 100.0);
            assert!(detail.key_results[1].initiatives.is_empty());
        }

        it "serializes with flattened fields" {
            let detail = hierarchy::objective_detail(&store, objective_id).unwrap();
            let json = serde_json::to_value(&detail).unwrap();
            assert_eq!(json["title"], "O");
            assert_eq!(json["status"], "active");
            assert_eq!(json["key_results"][0]["type"], "metric");
            assert_eq!(json["key_results"][0]["initiatives"][0]["status"], "not_started");
        }
    }

    describe "dashboard" {
        it "averages to zero with no objectives" {
            let store = InMemoryStore::new();
            let dashboard = hierarchy::dashboard(&store).unwrap();
            assert_eq!(dashboard.total_objectives, 0);
            assert_eq!(dashboard.avg_progress, 0.0);
            assert!(dashboard.objectives.is_empty());
        }

        it "averages per-objective progress and counts key results" {
            let store = InMemoryStore::new();
            let a = lifecycle::create_objective(&store, objective_input("A")).unwrap().objective.id;
            let b = lifecycle::create_objective(&store, objective_input("B")).unwrap().objective.id;
            lifecycle::create_key_result(&store, a, metric("a1", 100.0)).unwrap();
            lifecycle::create_key_result(&store, a, metric("a2", 50.0)).unwrap();
            lifecycle::create_key_result(&store, b, metric("b1", 25.0)).unwrap();

            let dashboard = hierarchy::dashboard(&store).unwrap();
            assert_eq!(dashboard.total_objectives, 2);
            assert_eq!(dashboard.objectives[0].progress, 75.0);
            assert_eq!(dashboard.objectives[0].key_results_count, 2);
            assert_eq!(dashboard.objectives[1].key_results_count, 1);
            assert_eq!(dashboard.avg_progress, 50.0);
        }

        it "lists objectives with progress" {
            let store = InMemoryStore::new();
            let a = lifecycle::create_objective(&store, objective_input("A")).unwrap().objective.id;
            lifecycle::create_key_result(&store, a, metric("a1", 20.0)).unwrap();

            let listed = hierarchy::list_objectives(&store).unwrap();
            assert_eq!(listed.len(), 1);
            assert_eq!(listed[0].progress, 20.0);
        }
    }
}
