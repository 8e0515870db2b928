use std::sync::Arc;
use std::thread;

use jitcc_abi::{HostApi, Invokable, InvocationContext, Status};
use jitcc_loader::BuiltinModule;
use parking_lot::Mutex;
use pretty_assertions::assert_eq;

use super::*;
use crate::Bridge;

type Log = Arc<Mutex<Vec<String>>>;

struct Recorder {
	log: Log,
	init_status: Status,
}

impl Invokable for Recorder {
	fn init(&mut self, _host: &HostApi, ctx: &InvocationContext, outputs: &mut [f64], inputs: &[f64]) -> Status {
		self.log.lock().push(format!("init ksmps={}", ctx.ksmps()));
		if let (Some(out), Some(input)) = (outputs.first_mut(), inputs.first()) {
			*out = input * 2.0;
		}
		self.init_status
	}

	fn kontrol(&mut self, _host: &HostApi, outputs: &mut [f64], inputs: &[f64]) -> Status {
		self.log.lock().push("kontrol".into());
		if let (Some(out), Some(input)) = (outputs.first_mut(), inputs.first()) {
			*out += input;
		}
		Status::OK
	}

	fn noteoff(&mut self, _host: &HostApi) -> Status {
		self.log.lock().push("noteoff".into());
		Status::OK
	}
}

impl Drop for Recorder {
	fn drop(&mut self) {
		self.log.lock().push("drop".into());
	}
}

fn bridge_with(name: &str, init_status: Status) -> (Bridge, Log) {
	let log = Log::default();
	let bridge = Bridge::default();
	let shared = Arc::clone(&log);
	bridge.register_builtin(BuiltinModule::new("recorder").factory(name, move || Recorder {
		log: Arc::clone(&shared),
		init_status,
	}));
	(bridge, log)
}

fn entries(log: &Log) -> Vec<String> {
	log.lock().clone()
}

#[test]
fn full_lifecycle_runs_in_order() {
	let (bridge, log) = bridge_with("rec", Status::OK);
	let host = HostApi::fallback();
	let ctx = InvocationContext::new(32, 1, 1);
	let mut out = [0.0];

	let inv = bridge.invoke("rec", ThreadMode::BOTH, host, &ctx, &mut out, &[3.0]).unwrap();
	assert_eq!(out, [6.0]);
	assert_eq!(inv.state(), Lifecycle::Initialized);
	inv.kontrol(host, &mut out, &[1.0]).unwrap();
	inv.kontrol(host, &mut out, &[1.0]).unwrap();
	assert_eq!(out, [8.0]);
	inv.noteoff(host).unwrap();
	assert_eq!(inv.state(), Lifecycle::Finalized);

	assert!(matches!(inv.kontrol(host, &mut out, &[]), Err(InvokeError::Finalized)));
	inv.noteoff(host).unwrap();
	drop(inv);
	assert_eq!(entries(&log), ["init ksmps=32", "kontrol", "kontrol", "noteoff", "drop"]);
}

#[test]
fn update_only_mode_skips_init() {
	let (bridge, log) = bridge_with("rec", Status::OK);
	let host = HostApi::fallback();
	let inv = bridge.invoke("rec", ThreadMode::UPDATE, host, &InvocationContext::default(), &mut [], &[]).unwrap();
	assert_eq!(inv.state(), Lifecycle::Uninitialized);
	assert!(matches!(inv.kontrol(host, &mut [], &[]), Err(InvokeError::NotInitialized)));
	inv.noteoff(host).unwrap();
	assert_eq!(entries(&log), ["drop"]);
}

#[test]
fn init_only_mode_skips_kontrol() {
	let (bridge, log) = bridge_with("rec", Status::OK);
	let host = HostApi::fallback();
	let inv = bridge.invoke("rec", ThreadMode::INIT, host, &InvocationContext::new(8, 0, 0), &mut [], &[]).unwrap();
	inv.kontrol(host, &mut [], &[]).unwrap();
	inv.noteoff(host).unwrap();
	assert_eq!(entries(&log), ["init ksmps=8", "noteoff", "drop"]);
}

#[test]
fn split_roles_share_one_instance() {
	let (bridge, log) = bridge_with("rec", Status::OK);
	let host = HostApi::fallback();
	let owner = Invocation::create(&bridge, "rec", ThreadMode::UPDATE, host).unwrap();
	let init_site = owner.attach(ThreadMode::INIT);
	assert!(!init_site.is_owner());
	assert!(owner.is_owner());
	assert_eq!((owner.mode(), init_site.mode()), (ThreadMode::UPDATE, ThreadMode::INIT));

	init_site.init(host, &InvocationContext::new(16, 0, 0), &mut [], &[]).unwrap();
	assert_eq!(owner.state(), Lifecycle::Initialized);
	owner.kontrol(host, &mut [], &[]).unwrap();
	init_site.kontrol(host, &mut [], &[]).unwrap();

	drop(owner);
	assert_eq!(init_site.state(), Lifecycle::Finalized);
	assert!(matches!(init_site.init(host, &InvocationContext::default(), &mut [], &[]), Err(InvokeError::Detached)));
	init_site.noteoff(host).unwrap();
	assert_eq!(entries(&log), ["init ksmps=16", "kontrol", "noteoff", "drop"]);
}

#[test]
fn dropping_an_initialized_instance_finalizes_it() {
	let (bridge, log) = bridge_with("rec", Status::OK);
	let host = HostApi::fallback();
	let inv = bridge.invoke("rec", ThreadMode::BOTH, host, &InvocationContext::default(), &mut [], &[]).unwrap();
	drop(inv);
	assert_eq!(entries(&log), ["init ksmps=0", "noteoff", "drop"]);
}

#[test]
fn failed_init_destroys_without_noteoff() {
	let (bridge, log) = bridge_with("rec", Status(7));
	let host = HostApi::fallback();
	let inv = Invocation::create(&bridge, "rec", ThreadMode::BOTH, host).unwrap();
	let err = inv.init(host, &InvocationContext::default(), &mut [], &[]).unwrap_err();
	assert!(matches!(err, InvokeError::Failed { phase: Phase::Init, status: Status(7) }));
	assert_eq!(err.status(), 7);
	assert_eq!(inv.state(), Lifecycle::Finalized);
	assert!(matches!(inv.init(host, &InvocationContext::default(), &mut [], &[]), Err(InvokeError::Finalized)));
	assert_eq!(entries(&log), ["init ksmps=0", "drop"]);
}

#[test]
fn second_init_is_rejected() {
	let (bridge, _log) = bridge_with("rec", Status::OK);
	let host = HostApi::fallback();
	let inv = bridge.invoke("rec", ThreadMode::BOTH, host, &InvocationContext::default(), &mut [], &[]).unwrap();
	assert!(matches!(
		inv.init(host, &InvocationContext::default(), &mut [], &[]),
		Err(InvokeError::AlreadyInitialized)
	));
	assert_eq!(inv.state(), Lifecycle::Initialized);
}

#[test]
fn unknown_factory_is_reported() {
	let (bridge, _log) = bridge_with("rec", Status::OK);
	let err = bridge
		.invoke("missing", ThreadMode::BOTH, HostApi::fallback(), &InvocationContext::default(), &mut [], &[])
		.unwrap_err();
	assert!(matches!(&err, InvokeError::FactoryNotFound(name) if name == "missing"));
	assert_eq!(err.status(), -3);
}

#[test]
fn first_registered_factory_wins() {
	let (bridge, log) = bridge_with("rec", Status::OK);
	let other = Log::default();
	let shared = Arc::clone(&other);
	bridge.register_builtin(BuiltinModule::new("later").factory("rec", move || Recorder {
		log: Arc::clone(&shared),
		init_status: Status::OK,
	}));
	let inv = bridge.invoke("rec", ThreadMode::BOTH, HostApi::fallback(), &InvocationContext::default(), &mut [], &[]).unwrap();
	drop(inv);
	assert_eq!(entries(&log).len(), 3);
	assert!(entries(&other).is_empty());
}

#[test]
fn too_many_outputs_are_rejected() {
	let (bridge, log) = bridge_with("rec", Status::OK);
	let mut out = vec![0.0; MAX_OUTPUTS + 1];
	let err = bridge
		.invoke("rec", ThreadMode::BOTH, HostApi::fallback(), &InvocationContext::default(), &mut out, &[])
		.unwrap_err();
	assert!(matches!(err, InvokeError::TooManyOutputs(41)));
	assert!(entries(&log).is_empty());
}

#[test]
fn thread_mode_from_raw() {
	assert_eq!(ThreadMode::from_raw(0).unwrap(), ThreadMode::BOTH);
	assert_eq!(ThreadMode::from_raw(1).unwrap(), ThreadMode::INIT);
	assert_eq!(ThreadMode::from_raw(2).unwrap(), ThreadMode::UPDATE);
	assert_eq!(ThreadMode::try_from(3).unwrap(), ThreadMode::BOTH);
	for raw in [-1, 4, 99] {
		let err = ThreadMode::from_raw(raw).unwrap_err();
		assert!(matches!(err, InvokeError::InvalidThreadMode(r) if r == raw));
		assert_eq!(err.status(), -5);
	}
}

#[test]
fn concurrent_construction_is_serialized() {
	let bridge = Arc::new(Bridge::default());
	let log = Log::default();
	for module in 0..4 {
		let shared = Arc::clone(&log);
		bridge.register_builtin(BuiltinModule::new(format!("m{module}")).factory(format!("rec{module}"), move || Recorder {
			log: Arc::clone(&shared),
			init_status: Status::OK,
		}));
	}

	let handles: Vec<_> = (0..8)
		.map(|t| {
			let bridge = Arc::clone(&bridge);
			thread::spawn(move || {
				for i in 0..25 {
					let name = format!("rec{}", (t + i) % 4);
					let inv = bridge
						.invoke(&name, ThreadMode::BOTH, HostApi::fallback(), &InvocationContext::default(), &mut [], &[])
						.unwrap();
					inv.kontrol(HostApi::fallback(), &mut [], &[]).unwrap();
					inv.noteoff(HostApi::fallback()).unwrap();
				}
			})
		})
		.collect();
	for handle in handles {
		handle.join().unwrap();
	}

	assert_eq!(bridge.registry().len(), 4);
	assert_eq!(entries(&log).len(), 8 * 25 * 4);
}

#[test]
fn teardown_is_idempotent_and_keeps_live_instances() {
	let (bridge, log) = bridge_with("rec", Status::OK);
	let host = HostApi::fallback();
	let inv = bridge.invoke("rec", ThreadMode::BOTH, host, &InvocationContext::default(), &mut [], &[]).unwrap();
	bridge.teardown();
	bridge.teardown();
	assert!(bridge.registry().is_empty());
	inv.kontrol(host, &mut [], &[]).unwrap();
	assert!(matches!(
		bridge.invoke("rec", ThreadMode::BOTH, host, &InvocationContext::default(), &mut [], &[]),
		Err(InvokeError::FactoryNotFound(_))
	));
	drop(inv);
	assert_eq!(entries(&log), ["init ksmps=0", "kontrol", "noteoff", "drop"]);
}
