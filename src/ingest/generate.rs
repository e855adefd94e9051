use std::io::{BufWriter, Write};
use std::path::Path;

/// 测试数据生成器：随机拼接 名 + 姓 [+ 后缀]，整体排序后写盘。
///
/// 必须全量排序后再写（导入管道要求输入已按全局排序排好），
/// 分批各自排序是不够的。
const FIRST_NAMES: &[&str] = &[
    "James", "John", "Robert", "Michael", "William", "David", "Richard", "Joseph", "Thomas",
    "Charles", "Adam", "Brian", "Aaron", "Chris", "Daniel", "Edward", "Frank", "George", "Henry",
    "Ian", "Jack", "Kevin", "Larry", "Matthew", "Nathan", "Oscar", "Paul", "Quincy", "Ryan",
    "Steven", "Timothy", "Ulysses", "Victor", "Walter", "Xavier", "Zachary",
];

const LAST_NAMES: &[&str] = &[
    "Smith", "Johnson", "Williams", "Jones", "Brown", "Davis", "Miller", "Wilson", "Moore",
    "Taylor", "Anderson", "Thomas", "Jackson", "White", "Harris", "Martin", "Thompson", "Garcia",
    "Martinez", "Robinson", "Clark", "Rodriguez", "Lewis", "Lee", "Walker", "Hall", "Allen",
    "Young", "Hernandez", "King", "Wright", "Lopez", "Hill", "Scott", "Green", "Adams", "Baker",
    "Gonzalez", "Nelson", "Carter",
];

const SUFFIXES: &[&str] = &[
    " Jr.", " Sr.", " II", " III", " IV", " V", " PhD", " MD", " DDS", " Esq.",
];

/// 轻量确定性 PRNG（xorshift64*）：测试数据不需要密码学随机。
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Rng(seed.max(1))
    }

    fn next(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.0 = x;
        x.wrapping_mul(0x2545_F491_4F6C_DD1D)
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[(self.next() % items.len() as u64) as usize]
    }
}

/// 生成 count 个名字（可重复），排序后返回。
pub fn generate_sorted_names(count: usize, seed: u64) -> Vec<String> {
    let mut rng = Rng::new(seed);
    let mut names = Vec::with_capacity(count);
    for _ in 0..count {
        let first = rng.pick(FIRST_NAMES);
        let last = rng.pick(LAST_NAMES);
        let suffix = if rng.next() % 10 == 0 {
            rng.pick(SUFFIXES)
        } else {
            ""
        };
        names.push(format!("{} {}{}", first, last, suffix));
    }
    names.sort();
    names
}

/// 生成并写盘，一行一个名字。
pub fn generate_file(path: &Path, count: usize, seed: u64) -> std::io::Result<()> {
    tracing::info!("generating {} test names into {:?}", count, path);
    let names = generate_sorted_names(count, seed);

    let f = std::fs::File::create(path)?;
    let mut w = BufWriter::new(f);
    for name in &names {
        writeln!(w, "{}", name)?;
    }
    w.flush()
}
