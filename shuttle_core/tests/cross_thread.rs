use std::{sync::mpsc, thread};

use shuttle_core::{
    create_entry, delete_entry, entry_to_value,
    runtime::{Instruction, Literal},
    Array, ArrayKey, Context, Entry, EntryKind, FunctionDescriptor, SharedMap, Value,
};

fn assert_transferable<T: Send + Sync>() {}

#[test]
fn test_entries_and_shared_structures_are_transferable() {
    assert_transferable::<Entry>();
    assert_transferable::<Box<Entry>>();
    assert_transferable::<SharedMap>();
    assert_transferable::<shuttle_core::MessageQueue>();
}

#[test]
fn test_queue_handle_is_shared_between_threads() {
    let _ = env_logger::builder().is_test(true).try_init();

    let (to_worker, from_main) = mpsc::channel::<Box<Entry>>();
    let (done, finished) = mpsc::channel::<()>();

    let mut main_ctx = Context::new();
    let queue_value = main_ctx.new_message_queue().unwrap();
    let entry = create_entry(&mut main_ctx, &queue_value);
    assert_eq!(entry.kind(), EntryKind::MessageQueueHandle);

    let worker = thread::spawn(move || {
        let mut ctx = Context::new();
        let entry = from_main.recv().unwrap();
        let handle = entry_to_value(&mut ctx, &entry).unwrap();
        delete_entry(entry);

        let queue = handle.as_object().unwrap().message_queue().unwrap();
        queue.push(&mut ctx, &Value::string("from worker"));
        let payload = Value::array([("n", Value::Int(7))].into_iter().collect::<Array>());
        queue.push(&mut ctx, &payload);
        done.send(()).unwrap();
    });

    to_worker.send(entry).unwrap();
    finished.recv().unwrap();
    worker.join().unwrap();

    let queue = queue_value.as_object().unwrap().message_queue().unwrap();
    assert_eq!(queue.len(), 2);
    assert_eq!(queue.pop(&mut main_ctx).unwrap(), Some(Value::string("from worker")));
    let payload = queue.pop(&mut main_ctx).unwrap().unwrap();
    assert_eq!(payload.as_array().unwrap().get(&ArrayKey::from("n")), Some(&Value::Int(7)));
    // `queue` plus the original object; the worker's handles are gone.
    assert_eq!(queue.handle_count(), 2);
}

#[test]
fn test_two_consumers_see_one_queue() {
    let mut main_ctx = Context::new();
    let queue_value = main_ctx.new_message_queue().unwrap();

    let workers: Vec<_> = (0..2)
        .map(|i| {
            let entry = create_entry(&mut main_ctx, &queue_value);
            thread::spawn(move || {
                let mut ctx = Context::new();
                let handle = entry_to_value(&mut ctx, &entry).unwrap();
                let queue = handle.as_object().unwrap().message_queue().unwrap();
                queue.push(&mut ctx, &Value::Int(i));
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    let queue = queue_value.as_object().unwrap().message_queue().unwrap();
    let mut seen = vec![
        queue.pop(&mut main_ctx).unwrap().unwrap().as_int().unwrap(),
        queue.pop(&mut main_ctx).unwrap().unwrap().as_int().unwrap(),
    ];
    seen.sort();
    assert_eq!(seen, vec![0, 1]);
}

#[test]
fn test_closure_crosses_into_worker_function_table() {
    let mut main_ctx = Context::new();
    let mut descriptor = FunctionDescriptor::new("{closure}").with_param("x");
    let two = descriptor.add_literal(Literal::Int(2));
    descriptor.emit(Instruction::LoadArg(0, 0));
    descriptor.emit(Instruction::LoadLiteral(1, two));
    descriptor.emit(Instruction::Mul(2, 0, 1));
    descriptor.emit(Instruction::Return(Some(2)));
    let closure = main_ctx.closure(descriptor.clone());

    let entry = create_entry(&mut main_ctx, &closure);
    assert_eq!(entry.kind(), EntryKind::Closure);

    let registered = thread::spawn(move || {
        let mut ctx = Context::new();
        let value = entry_to_value(&mut ctx, &entry).unwrap();
        delete_entry(entry);
        let copy = value.as_closure().unwrap().descriptor().clone();
        (copy, ctx.functions().len())
    })
    .join()
    .unwrap();

    assert_eq!(registered.0, descriptor);
    assert_eq!(registered.1, 1);
    assert_eq!(main_ctx.retained().len(), 1);
}

#[test]
fn test_shared_map_slots_cross_threads() {
    let map = SharedMap::new();
    let mut main_ctx = Context::new();
    map.set(&mut main_ctx, "config", &Value::array(Array::from_values([Value::Int(1), Value::Int(2)])));

    let worker_map = map.clone();
    thread::spawn(move || {
        let mut ctx = Context::new();
        let value = worker_map.get(&mut ctx, &ArrayKey::from("config")).unwrap().unwrap();
        value.as_array_mut().unwrap().push(Value::Int(3));
        worker_map.set(&mut ctx, "config", &value);
        worker_map.set(&mut ctx, 0i64, &Value::Float(0.5));
    })
    .join()
    .unwrap();

    let value = map.get(&mut main_ctx, &ArrayKey::from("config")).unwrap().unwrap();
    assert_eq!(value, Value::array(Array::from_values([Value::Int(1), Value::Int(2), Value::Int(3)])));
    assert_eq!(map.get(&mut main_ctx, &ArrayKey::Int(0)).unwrap(), Some(Value::Float(0.5)));
    assert_eq!(map.len(), 2);
}
