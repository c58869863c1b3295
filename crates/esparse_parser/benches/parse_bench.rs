use bumpalo::Bump;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use esparse_parser::{parse, ParserOptions};

// A medium-size module (~80 lines) with the common ES2017 constructs
const MODULE_SOURCE: &str = r#"
/**
 * A small event store.
 */
import { EventEmitter } from "events";
import * as path from "path";

const DEFAULTS = { retries: 3, timeout: 1000, dir: "./data" };

export class Store extends EventEmitter {
  constructor(options = {}) {
    super();
    this.options = Object.assign({}, DEFAULTS, options);
    this.items = new Map();
    this.version = 0;
  }

  get size() {
    return this.items.size;
  }

  static create(...args) {
    return new Store(...args);
  }

  async load(name) {
    const file = path.join(this.options.dir, `${name}.json`);
    for (let attempt = 0; attempt < this.options.retries; attempt++) {
      try {
        const { data, version } = await read(file);
        this.version = version;
        return data;
      } catch (err) {
        if (err.code === "ENOENT") return null;
      } finally {
        this.emit("attempt", attempt);
      }
    }
    throw new Error("unreachable");
  }

  *entries() {
    for (const [key, value] of this.items) {
      yield [key, value];
    }
  }

  put(key, value) {
    const previous = this.items.get(key);
    this.items.set(key, value);
    this.version += 1;
    this.emit("change", { key, value, previous });
    return previous !== undefined ? previous : value;
  }
}

// Helpers
function read(file) {
  return new Promise((resolve, reject) => {
    setTimeout(() => reject({ code: "ENOENT", file }), 0);
  });
}

export const sum = (list) => list.reduce((acc, x) => acc + x * 2 ** 2, 0);
export const isEmpty = value => value == null || (typeof value === "object" && !Object.keys(value).length);

label: while (true) {
  switch (Math.floor(Math.random() * 4)) {
    case 0: continue label;
    case 1: break;
    default: break label;
  }
}

export default Store;
"#;

// The same shape with annotations and markup
const FLOW_JSX_SOURCE: &str = r#"
type Props = { title: string, items: Array<{ id: number, label?: string }> };

export function List(props: Props): Element {
  const { title, items } = props;
  return (
    <section className="list">
      <h1>{title}</h1>
      <ul>
        {items.map((item: { id: number, label?: string }) => <li key={item.id}>{item.label || "-"}</li>)}
      </ul>
    </section>
  );
}
"#;

fn bench_parse_module(c: &mut Criterion) {
    let options = ParserOptions::module();
    c.bench_function("parse_module_medium", |b| {
        b.iter(|| {
            let arena = Bump::new();
            let file = parse(&arena, black_box(MODULE_SOURCE), &options);
            black_box(file.is_ok());
        });
    });
}

fn bench_parse_flow_jsx(c: &mut Criterion) {
    let options = ParserOptions::module().with_plugin("jsx").with_plugin("flow");
    c.bench_function("parse_flow_jsx_small", |b| {
        b.iter(|| {
            let arena = Bump::new();
            let file = parse(&arena, black_box(FLOW_JSX_SOURCE), &options);
            black_box(file.is_ok());
        });
    });
}

criterion_group!(benches, bench_parse_module, bench_parse_flow_jsx);
criterion_main!(benches);
