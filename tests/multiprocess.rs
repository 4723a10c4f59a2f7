/*!
 * Multiprocess Test
 * Two real processes running a matrix inversion over shared memory
 *
 * This test forks, so it must stay the only test in this harness binary:
 * forking is only safe while the process is single-threaded.
 */

use nix::sys::wait::{waitpid, WaitStatus};
use nix::unistd::{fork, ForkResult};
use shmpi::{launch, GroupConfig, Matrix, ProcessContext};

fn golden_scenario(rank: u32, group: &str) {
    let ctx = ProcessContext::attach(GroupConfig::new(rank, 2).with_group_name(group)).unwrap();

    let a = Matrix::new(&ctx, 2, 2).unwrap();
    if ctx.rank() == 0 {
        for (i, v) in [4.0, 7.0, 2.0, 6.0].iter().enumerate() {
            a.set(i / 2, i % 2, *v);
        }
    }
    ctx.synch();

    let det = a.determinant().unwrap();
    assert!((det - 10.0).abs() < 1e-12, "determinant was {}", det);

    let inv = a.inverse().unwrap();
    for (i, e) in [0.6, -0.7, -0.2, 0.4].iter().enumerate() {
        let got = inv.get(i / 2, i % 2);
        assert!((got - e).abs() < 1e-12, "inverse[{}] was {}", i, got);
    }
}

#[test]
fn two_processes_invert_the_same_matrix() {
    let _ = env_logger::builder().is_test(true).try_init();
    let group = format!("/shmpi-mp-{}", std::process::id());
    let _seg = launch::create_group_segment(&group, 2).unwrap();

    // SAFETY: no threads have been spawned in this binary.
    match unsafe { fork() }.unwrap() {
        ForkResult::Child => {
            let ok = std::panic::catch_unwind(|| golden_scenario(1, &group)).is_ok();
            std::process::exit(if ok { 0 } else { 1 });
        }
        ForkResult::Parent { child } => {
            golden_scenario(0, &group);
            let status = waitpid(child, None).unwrap();
            assert_eq!(status, WaitStatus::Exited(child, 0));
            launch::remove_group_segment(&group).unwrap();
        }
    }
}
