#![no_main]

use std::rc::Rc;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use vigil_property::{Bond, ReadableProperty, SimpleProperty, WritableProperty};

#[derive(Arbitrary, Debug)]
struct FuzzRing {
    size: u8,
    writes: Vec<(u8, i32)>,
}

// A ring of bonds p0 -> p1 -> ... -> p0 must settle after every write.
fuzz_target!(|input: FuzzRing| {
    let size = usize::from(input.size % 8) + 1;
    let props: Vec<_> = (0..size).map(|_| SimpleProperty::shared(0i32)).collect();
    let _bonds: Vec<_> = (0..size)
        .map(|i| {
            Bond::<i32, i32>::new(
                props[i].clone(),
                Rc::new(|n: i32| n.wrapping_add(1)),
                props[(i + 1) % size].clone(),
            )
        })
        .collect();

    for (idx, value) in input.writes.into_iter().take(64) {
        let target = &props[usize::from(idx) % size];
        target.set_value(value);
        assert_eq!(target.value(), value);
    }
});
