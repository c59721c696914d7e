//! Integration tests for the beacon registry

use beacon_registry::contract::*;
use beacon_registry::Config;
use serde_json::json;
use std::sync::Arc;

mod common;
use common::*;

#[test]
fn test_two_module_lifecycle() {
    print_test_header(
        "test_two_module_lifecycle",
        "Deploy nebula and pulsar, configure cratio twice, upgrade nebula only",
    );
    let beacon = new_beacon();

    // Version 1
    let nebula_v1 = beacon.deploy(nebula_v1());
    let pulsar_v1 = beacon.deploy(pulsar_v1());
    beacon
        .upgrade(&[nebula(), pulsar()], &[nebula_v1, pulsar_v1])
        .unwrap();
    beacon.configure(&[cratio()], &[value("600")]).unwrap();

    assert_eq!(beacon.get_contracts_version(), 1);
    assert_eq!(beacon.get_settings_version(), 1);
    assert_eq!(call(&beacon, nebula(), "whoami").unwrap(), json!("NebulaV1"));
    assert_eq!(call(&beacon, pulsar(), "whoami").unwrap(), json!("PulsarV1"));
    assert_eq!(beacon.get_setting(&cratio()), value("600"));

    // Configure version 1
    beacon.configure(&[cratio()], &[value("500")]).unwrap();
    assert_eq!(beacon.get_contracts_version(), 1);
    assert_eq!(beacon.get_settings_version(), 2);
    assert_eq!(beacon.get_setting(&cratio()), value("500"));

    // Version 2
    let nebula_gateway = beacon.get_proxy(&nebula()).unwrap();
    let nebula_v2 = beacon.deploy(Arc::new(NebulaV2::default()));
    beacon.upgrade(&[nebula()], &[nebula_v2]).unwrap();

    assert_eq!(beacon.get_contracts_version(), 2);
    assert_eq!(beacon.get_settings_version(), 2);
    assert_eq!(beacon.get_proxy(&nebula()).unwrap(), nebula_gateway);
    assert_eq!(call(&beacon, nebula(), "whoami").unwrap(), json!("NebulaV2"));
    assert_eq!(call(&beacon, pulsar(), "whoami").unwrap(), json!("PulsarV1"));
    assert_eq!(
        call(&beacon, nebula(), "whoispulsar").unwrap(),
        json!("PulsarV1")
    );
    assert_eq!(call(&beacon, nebula(), "getCRatio").unwrap(), json!("500"));
}

#[test]
fn test_upgrade_bumps_contracts_version_once_per_batch() {
    print_test_header(
        "test_upgrade_bumps_contracts_version_once_per_batch",
        "A batch of N bindings is one version, not N",
    );
    let beacon = new_beacon();

    for (round, size) in [1usize, 2, 5, 17].into_iter().enumerate() {
        let ids: Vec<ModuleId> = (0..size)
            .map(|i| module_id(&format!("m{}-{}", round, i)))
            .collect();
        let handles: Vec<ImplementationHandle> =
            ids.iter().map(|_| beacon.deploy(nebula_v1())).collect();

        let before = beacon.get_contracts_version();
        let after = beacon.upgrade(&ids, &handles).unwrap();

        assert_eq!(after, before + 1, "batch of {} bumped by more than 1", size);
        assert_eq!(beacon.get_contracts_version(), after);
    }
    assert_eq!(beacon.get_settings_version(), 0);
}

#[test]
fn test_configure_bumps_settings_version_once_per_batch() {
    let beacon = new_beacon();

    let ids: Vec<SettingId> = (0..4).map(|i| setting_id(&format!("s{}", i))).collect();
    let values: Vec<SettingValue> = (0..4).map(|i| value(&i.to_string())).collect();

    assert_eq!(beacon.configure(&ids, &values).unwrap(), 1);
    assert_eq!(beacon.configure(&ids[..1], &values[..1]).unwrap(), 2);
    assert_eq!(beacon.get_contracts_version(), 0);
    assert_eq!(beacon.get_setting(&setting_id("s3")), value("3"));
}

#[test]
fn test_versions_start_at_zero() {
    let beacon = new_beacon();
    assert_eq!(beacon.get_contracts_version(), 0);
    assert_eq!(beacon.get_settings_version(), 0);
    assert!(beacon.bindings().is_empty());
}

#[test]
fn test_empty_batches_still_bump_versions() {
    let beacon = new_beacon();
    assert_eq!(beacon.upgrade(&[], &[]).unwrap(), 1);
    assert_eq!(beacon.configure(&[], &[]).unwrap(), 1);
}

#[test]
fn test_gateway_handle_is_stable_across_upgrades() {
    print_test_header(
        "test_gateway_handle_is_stable_across_upgrades",
        "Re-registering a module swaps the implementation, never the gateway",
    );
    let beacon = new_beacon();

    let first = beacon.deploy(nebula_v1());
    beacon.upgrade(&[nebula()], &[first]).unwrap();
    let gateway = beacon.get_proxy(&nebula()).unwrap();
    let gateway_object = beacon.gateway(&nebula()).unwrap();

    for _ in 0..5 {
        let next = beacon.deploy(Arc::new(NebulaV2::default()));
        beacon.upgrade(&[nebula(), pulsar()], &[next, next]).unwrap();
        assert_eq!(beacon.get_proxy(&nebula()).unwrap(), gateway);
        assert_eq!(beacon.get_implementation(&nebula()), next);
    }

    assert!(Arc::ptr_eq(&gateway_object, &beacon.gateway(&nebula()).unwrap()));
    assert_eq!(beacon.bindings().len(), 2);
}

#[test]
fn test_upgrade_leaves_untouched_modules_alone() {
    let beacon = new_beacon();
    let n1 = beacon.deploy(nebula_v1());
    let p1 = beacon.deploy(pulsar_v1());
    beacon.upgrade(&[nebula(), pulsar()], &[n1, p1]).unwrap();
    let pulsar_binding = beacon.binding(&pulsar()).unwrap();

    let n2 = beacon.deploy(Arc::new(NebulaV2::default()));
    beacon.upgrade(&[nebula()], &[n2]).unwrap();

    assert_eq!(beacon.binding(&pulsar()).unwrap(), pulsar_binding);
    assert_eq!(beacon.get_implementation(&pulsar()), p1);
    assert_eq!(beacon.get_implementation(&nebula()), n2);
    assert_eq!(call(&beacon, pulsar(), "whoami").unwrap(), json!("PulsarV1"));
}

#[test]
fn test_arity_mismatch_is_all_or_nothing() {
    print_test_header(
        "test_arity_mismatch_is_all_or_nothing",
        "Mismatched batches touch no binding, no setting and no counter",
    );
    let beacon = new_beacon();
    let n1 = beacon.deploy(nebula_v1());
    beacon.upgrade(&[nebula()], &[n1]).unwrap();
    beacon.configure(&[cratio()], &[value("600")]).unwrap();
    let before = beacon.export_state();

    let n2 = beacon.deploy(Arc::new(NebulaV2::default()));
    assert_eq!(
        beacon.upgrade(&[nebula(), pulsar()], &[n2]),
        Err(BeaconError::ArityMismatch { ids: 2, values: 1 })
    );
    assert_eq!(
        beacon.configure(&[cratio()], &[value("1"), value("2")]),
        Err(BeaconError::ArityMismatch { ids: 1, values: 2 })
    );

    assert_eq!(beacon.export_state(), before);
    assert_eq!(beacon.get_implementation(&nebula()), n1);
    assert!(matches!(
        beacon.get_proxy(&pulsar()),
        Err(BeaconError::UnknownModule(_))
    ));
}

#[test]
fn test_unknown_implementation_is_rejected_before_mutation() {
    let beacon = new_beacon();
    let n1 = beacon.deploy(nebula_v1());
    let bogus = ImplementationHandle::generate();

    assert_eq!(
        beacon.upgrade(&[nebula(), pulsar()], &[n1, bogus]),
        Err(BeaconError::UnknownImplementation(bogus))
    );
    assert_eq!(
        beacon.upgrade(&[nebula()], &[ImplementationHandle::NONE]),
        Err(BeaconError::UnknownImplementation(ImplementationHandle::NONE))
    );
    assert_eq!(beacon.get_contracts_version(), 0);
    assert_eq!(beacon.get_implementation(&nebula()), ImplementationHandle::NONE);
}

#[test]
fn test_batch_size_limit() {
    let beacon = new_beacon_with(Config {
        max_batch_size: 2,
        ..Config::default()
    });
    let ids = [setting_id("a"), setting_id("b"), setting_id("c")];
    let values = [value("1"), value("2"), value("3")];

    assert_eq!(
        beacon.configure(&ids, &values),
        Err(BeaconError::BatchTooLarge { size: 3, max: 2 })
    );
    assert_eq!(beacon.configure(&ids[..2], &values[..2]).unwrap(), 1);
}

#[test]
fn test_duplicate_module_in_batch_last_wins() {
    let beacon = new_beacon();
    let n1 = beacon.deploy(nebula_v1());
    let n2 = beacon.deploy(Arc::new(NebulaV2::default()));

    beacon.upgrade(&[nebula(), nebula()], &[n1, n2]).unwrap();

    assert_eq!(beacon.get_contracts_version(), 1);
    assert_eq!(beacon.get_implementation(&nebula()), n2);
    assert_eq!(beacon.bindings().len(), 1);
}

#[test]
fn test_unregistered_queries_return_well_known_empties() {
    let beacon = new_beacon();

    assert_eq!(
        beacon.get_implementation(&module_id("ghost")),
        ImplementationHandle::NONE
    );
    assert_eq!(beacon.get_setting(&setting_id("ghost")), SettingValue::ZERO);
    assert_eq!(
        beacon.get_proxy(&module_id("ghost")),
        Err(BeaconError::UnknownModule(module_id("ghost")))
    );
    assert!(beacon.binding(&module_id("ghost")).is_none());
}

#[test]
fn test_gateway_by_handle() {
    let beacon = new_beacon();
    let n1 = beacon.deploy(nebula_v1());
    beacon.upgrade(&[nebula()], &[n1]).unwrap();

    let handle = beacon.get_proxy(&nebula()).unwrap();
    let gateway = beacon.gateway_by_handle(&handle).unwrap();
    assert_eq!(gateway.module_id(), nebula());
    assert_eq!(gateway.handle(), handle);
    assert!(beacon
        .gateway_by_handle(&GatewayHandle::generate())
        .is_none());
}

#[test]
fn test_export_state_is_sorted() {
    let beacon = new_beacon();
    let handle = beacon.deploy(nebula_v1());
    beacon
        .upgrade(&[module_id("zeta"), module_id("alpha")], &[handle, handle])
        .unwrap();
    beacon
        .configure(&[setting_id("y"), setting_id("b")], &[value("1"), value("2")])
        .unwrap();

    let state = beacon.export_state();
    assert_eq!(state.contracts_version, 1);
    assert_eq!(state.settings_version, 1);
    assert_eq!(state.bindings[0].module_id, module_id("alpha"));
    assert_eq!(state.bindings[1].module_id, module_id("zeta"));
    assert_eq!(state.settings[0].0, setting_id("b"));
}

#[test]
fn test_native_client_matches_beacon() {
    let module = beacon_registry::BeaconModule::default();
    module.init_in_memory(Config::default()).unwrap();
    let client = module.client().unwrap();

    let n1 = client.deploy(nebula_v1());
    assert_eq!(client.upgrade(&[nebula()], &[n1]).unwrap(), 1);
    assert_eq!(client.get_implementation(&nebula()), n1);
    assert_eq!(
        client.get_proxy(&nebula()).unwrap(),
        module.beacon().unwrap().get_proxy(&nebula()).unwrap()
    );
    assert_eq!(
        client.call(&nebula(), Call::new("whoami")).unwrap(),
        json!("NebulaV1")
    );
    assert_eq!(client.get_contracts_version(), 1);
    assert_eq!(client.get_settings_version(), 0);
}

#[test]
fn test_concurrent_readers_see_whole_batches() {
    print_test_header(
        "test_concurrent_readers_see_whole_batches",
        "Readers never observe half of a batch upgrade",
    );
    let beacon = new_beacon();
    let a = beacon.deploy(nebula_v1());
    let b = beacon.deploy(pulsar_v1());
    beacon.upgrade(&[nebula(), pulsar()], &[a, a]).unwrap();

    let writer = {
        let beacon = Arc::clone(&beacon);
        std::thread::spawn(move || {
            for i in 0..200 {
                let target = if i % 2 == 0 { b } else { a };
                beacon.upgrade(&[nebula(), pulsar()], &[target, target]).unwrap();
            }
        })
    };

    for _ in 0..2_000 {
        let state = beacon.export_state();
        assert_eq!(state.bindings.len(), 2);
        assert_eq!(
            state.bindings[0].implementation, state.bindings[1].implementation,
            "observed a partially applied batch at version {}",
            state.contracts_version
        );
    }

    writer.join().unwrap();
    assert_eq!(beacon.get_contracts_version(), 201);
}
