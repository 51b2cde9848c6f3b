// tests/reference_uniqueness.rs

use std::collections::HashSet;
use std::time::Duration;

use proptest::prelude::*;

use engine_supervisor::config::SupervisorSettings;
use engine_supervisor::dispatch::Dispatcher;
use engine_supervisor_test_utils::builders;
use engine_supervisor_test_utils::fake_launcher::FakeLauncher;

#[derive(Debug, Clone)]
enum Op {
    Create,
    /// Shut down the n-th live reference (modulo the live count).
    Shutdown(usize),
    /// Exit the n-th launched child on its own.
    Exit(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => Just(Op::Create),
        1 => any::<usize>().prop_map(Op::Shutdown),
        1 => any::<usize>().prop_map(Op::Exit),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn references_are_pairwise_distinct(ops in proptest::collection::vec(op_strategy(), 1..40)) {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        let issued = rt.block_on(async move {
            let launcher = FakeLauncher::new();
            let settings = SupervisorSettings::default().with_grace_period(Duration::from_millis(1));
            let mut dispatcher = Dispatcher::new(launcher.clone(), settings);
            let mut issued = Vec::new();
            let mut live: Vec<String> = Vec::new();

            for op in ops {
                match op {
                    Op::Create => {
                        let response = dispatcher
                            .handle_line(&builders::create(&["/bin/engine"]))
                            .await
                            .unwrap();
                        let reference = response.reference.unwrap();
                        issued.push(reference.clone());
                        live.push(reference);
                    }
                    Op::Shutdown(n) if !live.is_empty() => {
                        let reference = live.remove(n % live.len());
                        let response = dispatcher
                            .handle_line(&builders::shutdown(&reference))
                            .await
                            .unwrap();
                        assert!(response.ok);
                    }
                    Op::Exit(n) if launcher.launch_count() > 0 => {
                        launcher.control(n % launcher.launch_count()).exit_with(0);
                    }
                    _ => {}
                }
            }

            assert_eq!(dispatcher.registry().len(), live.len());
            issued
        });

        let distinct: HashSet<_> = issued.iter().collect();
        prop_assert_eq!(distinct.len(), issued.len());
    }
}
